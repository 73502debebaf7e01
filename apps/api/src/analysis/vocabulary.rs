//! Skill Vocabulary — canonical skill names, aliases, categories and substitute
//! families. Built once at startup and shared read-only by every request.
//!
//! The lexical scanner is a single Aho-Corasick automaton over every name and
//! alias (ASCII case-insensitive). All overlapping hits are collected, the ones
//! failing word-boundary, case or calendar checks are dropped, and the rest are
//! resolved leftmost-longest, so "Spring Boot" beats "Spring" while "React"
//! still survives in "React Nativeish".

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use aho_corasick::{AhoCorasick, MatchKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::analysis::SkillKey;

pub const BUILTIN_VERSION: &str = "2025.1";

/// One canonical skill and the spellings that resolve to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub name: String,
    pub category: String,
    /// Skills in the same family are close substitutes (React / Vue, MySQL / PostgreSQL).
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Only exact-case hits count ("Go", "Swift", "REST").
    #[serde(default)]
    pub case_sensitive: bool,
}

impl SkillDefinition {
    pub fn key(&self) -> SkillKey {
        SkillKey::new(&self.name)
    }

    fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// On-disk vocabulary extension (`SKILL_VOCABULARY_PATH`).
#[derive(Debug, Deserialize)]
pub struct VocabularyFile {
    pub version: String,
    pub skills: Vec<SkillDefinition>,
}

/// A bounded vocabulary hit in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalHit {
    pub definition: usize,
    pub start: usize,
    pub end: usize,
}

struct PatternInfo {
    definition: usize,
    /// Accepted exact spellings when the definition is case-sensitive.
    exact: Option<Vec<String>>,
    /// The spelling is also a season ("Spring").
    seasonal: bool,
}

const SEASONS: &[&str] = &["spring", "summer", "fall", "autumn", "winter"];

/// Words after a season that mark a date, not a skill: "Spring semester".
const CALENDAR_FOLLOWERS: &[&str] = &[
    "semester", "term", "quarter", "break", "season", "internship", "intern", "cohort", "session",
];

/// Words before a season that mark a date: "last Spring".
const CALENDAR_LEADS: &[&str] = &["this", "last", "next", "early", "late", "mid", "every", "since"];

pub struct SkillVocabulary {
    version: String,
    definitions: Vec<SkillDefinition>,
    by_key: HashMap<SkillKey, usize>,
    families: BTreeMap<String, usize>,
    automaton: AhoCorasick,
    patterns: Vec<PatternInfo>,
}

impl SkillVocabulary {
    pub fn builtin() -> Result<Self> {
        Self::new(BUILTIN_VERSION.to_string(), builtin_definitions())
    }

    /// Built-in vocabulary extended by a JSON file. File entries replace
    /// built-in entries with the same canonical key.
    pub fn with_extension_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill vocabulary '{}'", path.display()))?;
        let file: VocabularyFile = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid skill vocabulary JSON in '{}'", path.display()))?;

        let mut definitions = builtin_definitions();
        for extra in file.skills {
            let key = extra.key();
            match definitions.iter().position(|d| d.key() == key) {
                Some(idx) => definitions[idx] = extra,
                None => definitions.push(extra),
            }
        }

        info!(
            "Loaded {} vocabulary extension from {}",
            file.version,
            path.display()
        );
        Self::new(format!("{BUILTIN_VERSION}+{}", file.version), definitions)
    }

    pub fn new(version: String, definitions: Vec<SkillDefinition>) -> Result<Self> {
        let mut by_key = HashMap::new();
        let mut families = BTreeMap::new();
        let mut pattern_ids: HashMap<String, usize> = HashMap::new();
        let mut pattern_texts = Vec::new();
        let mut patterns: Vec<PatternInfo> = Vec::new();

        for (idx, definition) in definitions.iter().enumerate() {
            for spelling in definition.spellings() {
                by_key.entry(SkillKey::new(spelling)).or_insert(idx);

                let folded = spelling.trim().to_ascii_lowercase();
                if folded.is_empty() {
                    continue;
                }
                match pattern_ids.get(&folded) {
                    Some(&pid) if patterns[pid].definition == idx => {
                        if let Some(exact) = patterns[pid].exact.as_mut() {
                            exact.push(spelling.trim().to_string());
                        }
                    }
                    Some(_) => debug!("Spelling '{spelling}' already claimed; skipping"),
                    None => {
                        pattern_ids.insert(folded.clone(), patterns.len());
                        patterns.push(PatternInfo {
                            definition: idx,
                            exact: definition
                                .case_sensitive
                                .then(|| vec![spelling.trim().to_string()]),
                            seasonal: SEASONS.contains(&folded.as_str()),
                        });
                        pattern_texts.push(folded);
                    }
                }
            }
            if let Some(family) = &definition.family {
                families.entry(family.clone()).or_insert(0);
            }
        }

        // Dense, sorted family indices keep embeddings stable across runs.
        for (dense, slot) in families.values_mut().enumerate() {
            *slot = dense;
        }

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&pattern_texts)
            .context("Failed to build skill vocabulary automaton")?;

        Ok(Self {
            version,
            definitions,
            by_key,
            families,
            automaton,
            patterns,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn definition(&self, idx: usize) -> &SkillDefinition {
        &self.definitions[idx]
    }

    pub fn lookup(&self, key: &SkillKey) -> Option<&SkillDefinition> {
        self.by_key.get(key).map(|&idx| &self.definitions[idx])
    }

    /// Canonical key for a name: alias-resolved when known, plain key otherwise.
    pub fn resolve(&self, name: &str) -> SkillKey {
        let key = SkillKey::new(name);
        match self.lookup(&key) {
            Some(definition) => definition.key(),
            None => key,
        }
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    /// Dense family index for a resolved key.
    pub fn family_index(&self, key: &SkillKey) -> Option<usize> {
        self.lookup(key)
            .and_then(|d| d.family.as_ref())
            .and_then(|family| self.families.get(family).copied())
    }

    /// Every bounded vocabulary hit in `text`, in text order.
    pub fn scan(&self, text: &str) -> Vec<LexicalHit> {
        let mut candidates: Vec<LexicalHit> = self
            .automaton
            .find_overlapping_iter(text)
            .filter_map(|m| self.accept(text, m.pattern().as_usize(), m.start(), m.end()))
            .collect();

        // Leftmost first, longest first at the same start.
        candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut hits: Vec<LexicalHit> = Vec::new();
        for candidate in candidates {
            if hits.last().is_some_and(|last| candidate.start < last.end) {
                continue;
            }
            hits.push(candidate);
        }
        hits
    }

    /// Applies the boundary, exact-case and calendar checks to one raw hit.
    fn accept(&self, text: &str, pattern: usize, start: usize, end: usize) -> Option<LexicalHit> {
        let bytes = text.as_bytes();
        let info = &self.patterns[pattern];
        let found = &text[start..end];
        let mut bounded_end = end;

        if start > 0 && is_word_byte(bytes[start - 1]) {
            return None;
        }
        if end < bytes.len() && is_word_byte(bytes[end]) {
            // Accept a simple plural: "APIs", "microservices".
            let plural = matches!(bytes[end], b's' | b'S')
                && (end + 1 >= bytes.len() || !is_word_byte(bytes[end + 1]));
            if !plural {
                return None;
            }
            bounded_end += 1;
        }
        if let Some(exact) = &info.exact {
            if !exact.iter().any(|spelling| spelling == found) {
                return None;
            }
        }
        if info.seasonal && is_calendar_usage(&text[..start], &text[end..]) {
            return None;
        }

        Some(LexicalHit {
            definition: info.definition,
            start,
            end: bounded_end,
        })
    }
}

/// "Spring 2023", "Spring '24", "Spring semester", "last Spring".
fn is_calendar_usage(before: &str, after: &str) -> bool {
    let next = after
        .split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_ascii_lowercase());
    if let Some(next) = next.as_deref() {
        let is_year = matches!(next.len(), 2 | 4) && next.bytes().all(|b| b.is_ascii_digit());
        if is_year || CALENDAR_FOLLOWERS.contains(&next) {
            return true;
        }
    }

    before
        .split_whitespace()
        .next_back()
        .map(|w| w.to_ascii_lowercase())
        .is_some_and(|prev| CALENDAR_LEADS.contains(&prev.as_str()))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'#'
}

struct Builtin {
    name: &'static str,
    category: &'static str,
    family: Option<&'static str>,
    aliases: &'static [&'static str],
    case_sensitive: bool,
}

const fn skill(
    name: &'static str,
    category: &'static str,
    family: Option<&'static str>,
    aliases: &'static [&'static str],
) -> Builtin {
    Builtin {
        name,
        category,
        family,
        aliases,
        case_sensitive: false,
    }
}

const fn exact(
    name: &'static str,
    category: &'static str,
    family: Option<&'static str>,
    aliases: &'static [&'static str],
) -> Builtin {
    Builtin {
        name,
        category,
        family,
        aliases,
        case_sensitive: true,
    }
}

const LANG: &str = "Programming Languages";
const FRONTEND: &str = "Frontend";
const BACKEND: &str = "Backend";
const DATABASE: &str = "Database";
const DEVOPS: &str = "DevOps";
const CLOUD: &str = "Cloud";
const AI_ML: &str = "AI/ML";
const DATA: &str = "Data";
const TESTING: &str = "Testing";
const TOOLS: &str = "Tools";
pub(crate) const PRACTICES: &str = "Practices";
const MOBILE: &str = "Mobile";

const BUILTIN: &[Builtin] = &[
    // Languages
    skill("Python", LANG, None, &["Python3"]),
    skill("Java", LANG, Some("jvm-language"), &[]),
    skill("Kotlin", LANG, Some("jvm-language"), &[]),
    skill("Scala", LANG, Some("jvm-language"), &[]),
    skill("JavaScript", LANG, Some("js-language"), &["JS", "ECMAScript", "ES6"]),
    skill("TypeScript", LANG, Some("js-language"), &[]),
    exact("Go", LANG, None, &["Golang", "golang"]),
    skill("Rust", LANG, None, &[]),
    skill("C++", LANG, Some("c-family"), &["cpp"]),
    skill("C#", LANG, Some("dotnet-language"), &["csharp", "C Sharp"]),
    skill("Ruby", LANG, None, &[]),
    skill("PHP", LANG, None, &[]),
    exact("Swift", LANG, None, &[]),
    skill("Elixir", LANG, None, &[]),
    skill("Haskell", LANG, None, &[]),
    skill("Dart", LANG, None, &[]),
    skill("MATLAB", LANG, None, &[]),
    skill("SQL", DATABASE, None, &[]),
    // Frontend
    skill("React", FRONTEND, Some("frontend-framework"), &["ReactJS", "React.js"]),
    skill("Vue", FRONTEND, Some("frontend-framework"), &["Vue.js", "VueJS"]),
    skill("Angular", FRONTEND, Some("frontend-framework"), &["AngularJS"]),
    skill("Svelte", FRONTEND, Some("frontend-framework"), &["SvelteKit"]),
    skill("Next.js", FRONTEND, Some("ssr-framework"), &["NextJS"]),
    skill("Nuxt", FRONTEND, Some("ssr-framework"), &["Nuxt.js"]),
    skill("HTML", FRONTEND, None, &["HTML5"]),
    skill("CSS", FRONTEND, None, &["CSS3"]),
    skill("Tailwind CSS", FRONTEND, Some("css-framework"), &["Tailwind", "TailwindCSS"]),
    skill("Bootstrap", FRONTEND, Some("css-framework"), &[]),
    skill("Sass", FRONTEND, None, &["SCSS"]),
    skill("Redux", FRONTEND, None, &[]),
    skill("Frontend", PRACTICES, None, &["front-end", "front end"]),
    // Backend
    skill("Node.js", BACKEND, None, &["NodeJS", "Node JS"]),
    exact("Express", BACKEND, Some("js-backend"), &["Express.js", "ExpressJS"]),
    skill("NestJS", BACKEND, Some("js-backend"), &[]),
    skill("Django", BACKEND, Some("python-web"), &[]),
    skill("Flask", BACKEND, Some("python-web"), &[]),
    skill("FastAPI", BACKEND, Some("python-web"), &[]),
    skill("Spring Boot", BACKEND, Some("jvm-web"), &["SpringBoot"]),
    exact("Spring", BACKEND, Some("jvm-web"), &["Spring Framework"]),
    skill("Ruby on Rails", BACKEND, None, &["Rails", "RoR"]),
    skill(".NET", BACKEND, Some("dotnet"), &[".NET Core", "ASP.NET", "dotnet"]),
    skill("Laravel", BACKEND, None, &[]),
    exact("REST", BACKEND, Some("api-style"), &["REST API", "RESTful", "RESTful API"]),
    skill("GraphQL", BACKEND, Some("api-style"), &[]),
    skill("gRPC", BACKEND, Some("api-style"), &[]),
    skill("OAuth", BACKEND, Some("auth"), &["OAuth2", "OAuth 2.0"]),
    skill("JWT", BACKEND, Some("auth"), &[]),
    skill("Backend", PRACTICES, None, &["back-end", "back end"]),
    skill("Microservices", PRACTICES, None, &["microservice", "microservice architecture"]),
    // Databases
    skill("PostgreSQL", DATABASE, Some("relational-db"), &["Postgres", "psql"]),
    skill("MySQL", DATABASE, Some("relational-db"), &[]),
    skill("SQL Server", DATABASE, Some("relational-db"), &["MSSQL", "Microsoft SQL Server"]),
    skill("SQLite", DATABASE, Some("relational-db"), &[]),
    skill("MariaDB", DATABASE, Some("relational-db"), &[]),
    skill("Oracle Database", DATABASE, Some("relational-db"), &["Oracle DB"]),
    skill("MongoDB", DATABASE, Some("nosql-db"), &["Mongo"]),
    skill("DynamoDB", DATABASE, Some("nosql-db"), &[]),
    skill("Cassandra", DATABASE, Some("nosql-db"), &[]),
    skill("CouchDB", DATABASE, Some("nosql-db"), &[]),
    skill("Redis", DATABASE, Some("cache"), &[]),
    skill("Memcached", DATABASE, Some("cache"), &[]),
    skill("Elasticsearch", DATABASE, Some("search-engine"), &["Elastic Search"]),
    skill("OpenSearch", DATABASE, Some("search-engine"), &[]),
    skill("Neo4j", DATABASE, None, &[]),
    skill("Snowflake", DATA, Some("warehouse"), &[]),
    skill("BigQuery", DATA, Some("warehouse"), &[]),
    skill("Redshift", DATA, Some("warehouse"), &[]),
    // DevOps
    skill("Docker", DEVOPS, Some("containers"), &["Dockerfile", "Docker Compose"]),
    skill("Podman", DEVOPS, Some("containers"), &[]),
    skill("Kubernetes", DEVOPS, Some("orchestration"), &["K8s", "kubectl"]),
    skill("OpenShift", DEVOPS, Some("orchestration"), &[]),
    skill("Helm", DEVOPS, None, &[]),
    skill("Terraform", DEVOPS, Some("iac"), &[]),
    skill("Ansible", DEVOPS, Some("iac"), &[]),
    skill("Pulumi", DEVOPS, Some("iac"), &[]),
    skill("CloudFormation", DEVOPS, Some("iac"), &["AWS CloudFormation"]),
    exact("Chef", DEVOPS, Some("iac"), &[]),
    exact("Puppet", DEVOPS, Some("iac"), &[]),
    skill("Jenkins", DEVOPS, Some("ci-server"), &[]),
    skill("GitHub Actions", DEVOPS, Some("ci-server"), &[]),
    skill("GitLab CI", DEVOPS, Some("ci-server"), &["GitLab CI/CD"]),
    skill("CircleCI", DEVOPS, Some("ci-server"), &[]),
    skill(
        "CI/CD",
        PRACTICES,
        None,
        &["CICD", "continuous integration", "continuous delivery", "continuous deployment"],
    ),
    skill("Prometheus", DEVOPS, Some("observability"), &[]),
    skill("Grafana", DEVOPS, Some("observability"), &[]),
    skill("Datadog", DEVOPS, Some("observability"), &[]),
    skill("Nginx", DEVOPS, None, &[]),
    skill("Linux", DEVOPS, None, &["Ubuntu", "RHEL"]),
    skill("Bash", TOOLS, Some("shell"), &["shell scripting"]),
    skill("PowerShell", TOOLS, Some("shell"), &[]),
    skill("DevOps", PRACTICES, None, &[]),
    skill("MLOps", PRACTICES, None, &[]),
    // Cloud
    skill("AWS", CLOUD, Some("cloud-provider"), &["Amazon Web Services"]),
    skill("Azure", CLOUD, Some("cloud-provider"), &["Microsoft Azure"]),
    skill("GCP", CLOUD, Some("cloud-provider"), &["Google Cloud", "Google Cloud Platform"]),
    skill("Serverless", CLOUD, None, &[]),
    // AI / ML
    skill("Machine Learning", AI_ML, None, &["ML"]),
    skill("Deep Learning", AI_ML, None, &[]),
    skill("NLP", AI_ML, None, &["Natural Language Processing"]),
    skill("Computer Vision", AI_ML, None, &[]),
    skill("TensorFlow", AI_ML, Some("ml-framework"), &[]),
    skill("PyTorch", AI_ML, Some("ml-framework"), &[]),
    skill("Keras", AI_ML, Some("ml-framework"), &[]),
    skill("scikit-learn", AI_ML, None, &["sklearn", "scikit learn"]),
    skill("LLM", AI_ML, None, &["Large Language Models", "Large Language Model"]),
    // Data
    skill("Pandas", DATA, None, &[]),
    skill("NumPy", DATA, None, &[]),
    exact("Spark", DATA, Some("big-data"), &["Apache Spark", "PySpark"]),
    skill("Hadoop", DATA, Some("big-data"), &[]),
    skill("Kafka", DATA, Some("message-broker"), &["Apache Kafka"]),
    skill("RabbitMQ", DATA, Some("message-broker"), &[]),
    skill("Airflow", DATA, None, &["Apache Airflow"]),
    skill("dbt", DATA, None, &[]),
    skill("Tableau", DATA, Some("bi"), &[]),
    skill("Power BI", DATA, Some("bi"), &["PowerBI"]),
    skill("Looker", DATA, Some("bi"), &[]),
    skill("Data Science", DATA, None, &[]),
    skill("ETL", DATA, None, &[]),
    // Testing
    skill("Jest", TESTING, Some("js-unit-test"), &[]),
    skill("Mocha", TESTING, Some("js-unit-test"), &[]),
    skill("Vitest", TESTING, Some("js-unit-test"), &[]),
    skill("pytest", TESTING, None, &[]),
    skill("JUnit", TESTING, None, &[]),
    skill("Cypress", TESTING, Some("e2e-test"), &[]),
    skill("Playwright", TESTING, Some("e2e-test"), &[]),
    skill("Selenium", TESTING, Some("e2e-test"), &[]),
    skill("TDD", PRACTICES, None, &["Test-Driven Development", "test driven development"]),
    // Tools
    skill("Git", TOOLS, None, &[]),
    skill("GitHub", TOOLS, Some("code-hosting"), &[]),
    skill("GitLab", TOOLS, Some("code-hosting"), &[]),
    skill("Bitbucket", TOOLS, Some("code-hosting"), &[]),
    skill("Jira", TOOLS, None, &[]),
    skill("Figma", TOOLS, None, &[]),
    skill("Webpack", TOOLS, Some("bundler"), &[]),
    skill("Vite", TOOLS, Some("bundler"), &[]),
    skill("esbuild", TOOLS, Some("bundler"), &[]),
    // Practices
    skill("Agile", PRACTICES, Some("agile-method"), &[]),
    skill("Scrum", PRACTICES, Some("agile-method"), &[]),
    skill("Kanban", PRACTICES, Some("agile-method"), &[]),
    skill("System Design", PRACTICES, None, &[]),
    skill("Distributed Systems", PRACTICES, None, &[]),
    // Mobile
    skill("iOS", MOBILE, None, &[]),
    skill("Android", MOBILE, None, &[]),
    skill("React Native", MOBILE, Some("cross-platform-mobile"), &[]),
    skill("Flutter", MOBILE, Some("cross-platform-mobile"), &[]),
];

fn builtin_definitions() -> Vec<SkillDefinition> {
    BUILTIN
        .iter()
        .map(|b| SkillDefinition {
            name: b.name.to_string(),
            category: b.category.to_string(),
            family: b.family.map(str::to_string),
            aliases: b.aliases.iter().map(|a| a.to_string()).collect(),
            case_sensitive: b.case_sensitive,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn vocabulary() -> SkillVocabulary {
        SkillVocabulary::builtin().unwrap()
    }

    fn names(vocab: &SkillVocabulary, text: &str) -> Vec<String> {
        vocab
            .scan(text)
            .into_iter()
            .map(|hit| vocab.definition(hit.definition).name.clone())
            .collect()
    }

    #[test]
    fn test_builtin_keys_are_unique() {
        let vocab = vocabulary();
        let mut keys: Vec<_> = BUILTIN.iter().map(|b| SkillKey::new(b.name)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), vocab.len());
    }

    #[test]
    fn test_aliases_resolve_to_canonical_key() {
        let vocab = vocabulary();
        assert_eq!(vocab.resolve("k8s").as_str(), "kubernetes");
        assert_eq!(vocab.resolve("Postgres").as_str(), "postgresql");
        assert_eq!(vocab.resolve("React.js").as_str(), "react");
        assert_eq!(vocab.resolve("Snowplow").as_str(), "snowplow");
    }

    #[test]
    fn test_scan_is_case_insensitive_with_boundaries() {
        let vocab = vocabulary();
        assert_eq!(
            names(&vocab, "built services in PYTHON and docker; javascript UIs"),
            vec!["Python", "Docker", "JavaScript"]
        );
    }

    #[test]
    fn test_scan_prefers_longest_spelling() {
        let vocab = vocabulary();
        assert_eq!(names(&vocab, "Spring Boot services"), vec!["Spring Boot"]);
        assert_eq!(names(&vocab, "GitHub Actions pipelines"), vec!["GitHub Actions"]);
    }

    #[test]
    fn test_shorter_spelling_survives_when_longest_is_embedded() {
        let vocab = vocabulary();
        assert_eq!(names(&vocab, "React Nativeish UI kit"), vec!["React"]);
        assert_eq!(names(&vocab, "React Native apps"), vec!["React Native"]);
    }

    #[test]
    fn test_season_is_not_the_framework() {
        let vocab = vocabulary();
        assert!(names(&vocab, "Interned in Spring 2023 and again last Spring").is_empty());
        assert_eq!(names(&vocab, "Spring semester project in Java"), vec!["Java"]);
        assert_eq!(names(&vocab, "Spring '24 cohort"), Vec::<String>::new());
        assert_eq!(
            names(&vocab, "Java services on Spring and Spring Boot"),
            vec!["Java", "Spring", "Spring Boot"]
        );
    }

    #[test]
    fn test_scan_rejects_embedded_hits() {
        let vocab = vocabulary();
        // "java" inside "javanese", "go" inside "google", "rust" inside "trust".
        assert!(names(&vocab, "javanese google trust").is_empty());
    }

    #[test]
    fn test_case_sensitive_skills_need_exact_case() {
        let vocab = vocabulary();
        assert_eq!(names(&vocab, "Wrote Go services"), vec!["Go"]);
        assert!(names(&vocab, "ready to go live with the rest of the team").is_empty());
        assert_eq!(names(&vocab, "designed REST APIs"), vec!["REST"]);
    }

    #[test]
    fn test_symbol_skills_are_found() {
        let vocab = vocabulary();
        assert_eq!(
            names(&vocab, "C++ and C# on .NET with CI/CD"),
            vec!["C++", "C#", ".NET", "CI/CD"]
        );
    }

    #[test]
    fn test_plural_hits_are_accepted() {
        let vocab = vocabulary();
        assert_eq!(names(&vocab, "Built microservices"), vec!["Microservices"]);
    }

    #[test]
    fn test_families_are_shared_by_substitutes() {
        let vocab = vocabulary();
        let react = vocab.family_index(&vocab.resolve("React"));
        let vue = vocab.family_index(&vocab.resolve("Vue"));
        let docker = vocab.family_index(&vocab.resolve("Docker"));
        let kubernetes = vocab.family_index(&vocab.resolve("Kubernetes"));
        assert!(react.is_some());
        assert_eq!(react, vue);
        assert_ne!(docker, kubernetes);
        assert_eq!(vocab.family_index(&vocab.resolve("Python")), None);
    }

    #[test]
    fn test_extension_file_adds_and_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"version": "team-1", "skills": [
                {{"name": "Snowplow", "category": "Data", "aliases": ["snowplow analytics"]}},
                {{"name": "Rust", "category": "Programming Languages", "family": "systems-language"}}
            ]}}"#
        )
        .unwrap();

        let vocab = SkillVocabulary::with_extension_file(file.path()).unwrap();
        assert_eq!(vocab.version(), format!("{BUILTIN_VERSION}+team-1"));
        assert_eq!(vocab.resolve("Snowplow Analytics").as_str(), "snowplow");
        assert!(vocab.family_index(&vocab.resolve("Rust")).is_some());
        assert_eq!(names(&vocab, "Snowplow and Rust"), vec!["Snowplow", "Rust"]);
    }

    #[test]
    fn test_missing_extension_file_is_an_error() {
        assert!(SkillVocabulary::with_extension_file(Path::new("/nonexistent/vocab.json")).is_err());
    }
}
