use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::document::pdf_writer::TextDocument;
use crate::error::PdfWriteError;

const CLIENTS: &[&str] = &[
    "Apex Corp",
    "Zenith Bank",
    "Omicron Logistics",
    "Delta Health",
    "Nova Energy",
    "Cyber Systems",
    "Global Freight",
    "Urban Retail",
    "Rapid Finance",
    "Blue Sky Aviation",
];

const TECH_STACKS: &[&str] = &[
    "Python/Django",
    "React/Node.js",
    "Java Spring Boot",
    "AWS Lambda",
    "Azure DevOps",
    "Google Cloud AI",
    "Kubernetes",
    "Docker Swarm",
    "PostgreSQL",
    "MongoDB",
];

const OUTCOMES: &[&str] = &[
    "Reduced latency by 40%",
    "Saved $2M annually",
    "Automated 90% of workflow",
    "Improved uptime to 99.99%",
    "Cut server costs by 50%",
];

const LOCATIONS: &[&str] = &[
    "Dubai",
    "London",
    "New York",
    "Singapore",
    "Karachi",
    "Berlin",
    "Toronto",
];

const NAMES: &[&str] = &[
    "Ali Khan",
    "Sarah Jenkins",
    "David Chen",
    "Fatima Ahmed",
    "John Smith",
    "Maria Garcia",
    "Wei Zhang",
    "Omar Farooq",
    "Emily Davis",
    "Rahul Gupta",
];

const ROLES: &[&str] = &[
    "Senior Architect",
    "DevOps Engineer",
    "Data Scientist",
    "Project Manager",
    "Security Specialist",
];

const POLICY_TOPICS: &[&str] = &[
    "Data Retention",
    "Remote Access",
    "Password Policy",
    "Vendor Management",
    "Incident Response",
];

const SECURITY_TEXT: &str = "
1. Information Security Policy
NexusTech Solutions is ISO 27001 certified. All customer data is encrypted
at rest using AES-256 standards and in transit using TLS 1.3.
";

const PRICING_TEXT: &str = "
Standard Rate Card (2025)
- Enterprise Tier: $5,000 / month (Unlimited users)
- Senior Solution Architect: $250 / hour
";

/// How many documents of each templated family to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisCounts {
    pub case_studies: usize,
    pub profiles: usize,
    pub policies: usize,
    pub tech_specs: usize,
}

impl Default for SynthesisCounts {
    fn default() -> Self {
        Self {
            case_studies: 20,
            profiles: 15,
            policies: 10,
            tech_specs: 10,
        }
    }
}

impl SynthesisCounts {
    /// Templated documents plus the two master files.
    pub fn total(&self) -> usize {
        2 + self.case_studies + self.profiles + self.policies + self.tech_specs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticDocument {
    pub file_name: String,
    pub body: String,
}

impl SyntheticDocument {
    fn new(file_name: String, body: String) -> Self {
        Self { file_name, body }
    }

    /// `CONFIDENTIAL: ` plus the file stem with underscores as spaces.
    pub fn title(&self) -> String {
        let stem = self.file_name.trim_end_matches(".pdf").replace('_', " ");
        format!("CONFIDENTIAL: {}", stem)
    }

    pub fn to_pdf(&self) -> TextDocument {
        let mut doc = TextDocument::new(self.title());
        doc.push_text(&self.body);
        doc
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, PdfWriteError> {
        let path = dir.join(&self.file_name);
        self.to_pdf().save(&path)?;
        Ok(path)
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

/// Fills every template; no filesystem access. Same seed, same corpus.
pub fn plan<R: Rng + ?Sized>(counts: &SynthesisCounts, rng: &mut R) -> Vec<SyntheticDocument> {
    let mut docs = vec![
        SyntheticDocument::new("00_MASTER_SECURITY.pdf".to_string(), SECURITY_TEXT.to_string()),
        SyntheticDocument::new("00_MASTER_PRICING.pdf".to_string(), PRICING_TEXT.to_string()),
    ];

    docs.extend((0..counts.case_studies).map(|i| case_study(i, rng)));
    docs.extend((0..counts.profiles).map(|i| profile(i, rng)));
    docs.extend((0..counts.policies).map(|i| policy(i, rng)));
    docs.extend((0..counts.tech_specs).map(|i| tech_spec(i, rng)));
    docs
}

/// Plans and writes the whole corpus into `output_dir`, creating it if
/// needed and overwriting files with the same names. `on_written` runs after
/// each file lands on disk.
pub fn generate<R, F>(
    output_dir: &Path,
    counts: &SynthesisCounts,
    rng: &mut R,
    mut on_written: F,
) -> Result<Vec<PathBuf>, PdfWriteError>
where
    R: Rng + ?Sized,
    F: FnMut(&SyntheticDocument),
{
    fs::create_dir_all(output_dir)?;
    plan(counts, rng)
        .iter()
        .map(|doc| {
            let path = doc.write_to(output_dir)?;
            on_written(doc);
            Ok(path)
        })
        .collect()
}

fn case_study<R: Rng + ?Sized>(i: usize, rng: &mut R) -> SyntheticDocument {
    let client = pick(rng, CLIENTS);
    let tech = pick(rng, TECH_STACKS);
    let outcome = pick(rng, OUTCOMES);
    let location = pick(rng, LOCATIONS);
    let contact = pick(rng, NAMES);

    let body = format!(
        "PROJECT CASE STUDY: {client}
--------------------------------
Client Industry: Enterprise Level
Location: {location}

Challenge:
The client faced significant scalability issues with their legacy infrastructure.
Data processing was taking 48+ hours, leading to business delays.

Solution Delivered by NexusTech:
We implemented a microservices architecture using {tech}.
The system was deployed across three availability zones for maximum redundancy.

Key Results:
- {outcome}
- Integrated fully with existing legacy systems within 3 months.
- Security audit passed with 0 critical vulnerabilities.

Technical Contact: {contact}"
    );
    SyntheticDocument::new(format!("Case_Study_{client}_{i}.pdf"), body)
}

fn profile<R: Rng + ?Sized>(i: usize, rng: &mut R) -> SyntheticDocument {
    let name = pick(rng, NAMES);
    let role = pick(rng, ROLES);
    let tech = pick(rng, TECH_STACKS);
    let years: u32 = rng.gen_range(1..=10);
    let client = pick(rng, CLIENTS);
    let clearance: u32 = rng.gen_range(1..=3);

    let body = format!(
        "EMPLOYEE PROFILE: {name}
--------------------------------
Current Role: {role}
Years at NexusTech: {years} years

Certifications:
- Certified {tech} Professional
- AWS Solutions Architect Associate
- Scrum Master Certified

Project History:
- Lead Engineer for the {client} migration project.
- Developed the core API for our internal automation tool.

Clearance Level: Level {clearance} Security Clearance"
    );
    SyntheticDocument::new(format!("Profile_{}_{i}.pdf", name.replace(' ', "_")), body)
}

fn policy<R: Rng + ?Sized>(i: usize, rng: &mut R) -> SyntheticDocument {
    let topic = pick(rng, POLICY_TOPICS);
    let number: u32 = rng.gen_range(1000..=9999);

    let body = format!(
        "INTERNAL POLICY #{number}: {topic}
--------------------------------
Effective Date: 2024-01-01

1. Purpose
To establish strict guidelines regarding {topic} to ensure ISO 27001 compliance.

2. Scope
This policy applies to all full-time employees and contractors.

3. Policy Details
- All systems must adhere to strict logging protocols.
- Violations of this policy will result in immediate disciplinary action.
- Audits occur quarterly.

Approved By: Chief Information Security Officer (CISO)"
    );
    SyntheticDocument::new(format!("Policy_{}_{i}.pdf", topic.replace(' ', "_")), body)
}

fn tech_spec<R: Rng + ?Sized>(i: usize, rng: &mut R) -> SyntheticDocument {
    let tech = pick(rng, TECH_STACKS);
    let version: u32 = rng.gen_range(1..=5);
    let prefix = tech.split('/').next().unwrap_or(tech);

    let body = format!(
        "TECHNICAL SPECIFICATION: {tech} Standard
--------------------------------
Version: {version}.0

Overview:
This document outlines the standard configuration for using {tech}
within the NexusTech ecosystem.

Configuration:
- Memory Limit: 512MB minimum
- Timeout: 30 seconds
- Logging: JSON format required

Deployment Strategy:
Blue/Green deployment is mandatory for all production services utilizing this stack."
    );
    SyntheticDocument::new(format!("Tech_Spec_{prefix}_{i}.pdf"), body)
}
