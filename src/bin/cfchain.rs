//! cfchain command-line diagnosis
//!
//! Loads a rule file, takes the observed symptoms as flags, runs inference
//! and prints the ranked diagnoses.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use cfchain::{
    load_annotations, load_rules, Annotations, Confidence, DiagnosisReport, EngineConfig,
    Evidence, FactId, InferenceEngine, ReportOptions,
};

/// CLI configuration
struct Config {
    /// Rule file (JSON array of rule records)
    rules: PathBuf,
    /// Optional description file (JSON object)
    annotations: Option<PathBuf>,
    /// Checked symptoms
    symptoms: Vec<FactId>,
    /// Report filtering
    report: ReportOptions,
    /// Print every rule firing
    trace: bool,
    /// Print the symptom universe and exit
    list_symptoms: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: PathBuf::from("rules.json"),
            annotations: None,
            symptoms: Vec::new(),
            report: ReportOptions::default(),
            trace: false,
            list_symptoms: false,
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

fn value_of(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(v) => v.clone(),
        None => fail(&format!("{flag} requires a value")),
    }
}

fn print_help() {
    println!("cfchain - certainty factor diagnosis");
    println!();
    println!("USAGE:");
    println!("    cfchain [OPTIONS] --symptom <ID>...");
    println!();
    println!("OPTIONS:");
    println!("    -r, --rules <PATH>            Rule file [default: rules.json]");
    println!("    -a, --annotations <PATH>      Diagnosis descriptions file");
    println!("    -s, --symptom <ID>            Observed symptom (repeatable)");
    println!("        --min-confidence <CF>     Hide diagnoses below this confidence");
    println!("        --limit <N>               Show at most N diagnoses");
    println!("        --trace                   Print every rule firing");
    println!("        --list-symptoms           List the symptoms the rules know and exit");
    println!("    -h, --help                    Print help information");
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rules" | "-r" => {
                config.rules = PathBuf::from(value_of(&args, i, "--rules"));
                i += 2;
            }
            "--annotations" | "-a" => {
                config.annotations = Some(PathBuf::from(value_of(&args, i, "--annotations")));
                i += 2;
            }
            "--symptom" | "-s" => {
                config.symptoms.push(FactId::new(value_of(&args, i, "--symptom")));
                i += 2;
            }
            "--min-confidence" => {
                let raw = value_of(&args, i, "--min-confidence");
                config.report.min_confidence = raw
                    .parse::<f64>()
                    .ok()
                    .and_then(|v| Confidence::new(v).ok())
                    .unwrap_or_else(|| fail(&format!("invalid confidence: {raw}")));
                i += 2;
            }
            "--limit" => {
                let raw = value_of(&args, i, "--limit");
                let limit = raw
                    .parse::<usize>()
                    .unwrap_or_else(|_| fail(&format!("invalid limit: {raw}")));
                config.report.limit = Some(limit);
                i += 2;
            }
            "--trace" => {
                config.trace = true;
                i += 1;
            }
            "--list-symptoms" => {
                config.list_symptoms = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg => fail(&format!("unknown argument: {arg}")),
        }
    }

    config
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = parse_args();

    let rules = load_rules(&config.rules)?;
    let symptoms = rules.symptoms();

    if config.list_symptoms {
        for symptom in &symptoms {
            println!("{symptom}\t{}", symptom.label());
        }
        return Ok(());
    }

    let annotations = match &config.annotations {
        Some(path) => load_annotations(path)?,
        None => Annotations::new(),
    };

    for symptom in &config.symptoms {
        if !symptoms.contains(symptom) {
            tracing::warn!(symptom = %symptom, "symptom is not a premise of any rule");
        }
    }

    let evidence = Evidence::from_checked(config.symptoms.iter().cloned());
    let engine = InferenceEngine::new(EngineConfig {
        record_trace: config.trace,
    });
    let outcome = engine.run_with_evidence(&rules, &evidence);

    tracing::info!(
        rules = rules.len(),
        fired = outcome.fired.len(),
        passes = outcome.passes,
        fingerprint = %outcome.rule_set_fingerprint,
        "inference complete"
    );

    if config.trace {
        for firing in &outcome.trace {
            println!("{firing}");
        }
        println!();
    }

    let report = DiagnosisReport::build(&outcome.facts, &symptoms, &annotations, &config.report);
    print!("{report}");
    Ok(())
}
