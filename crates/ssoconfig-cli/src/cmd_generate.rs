use crate::config;
use anyhow::{Context, Result};
use clap::Args;
use ssoconfig::{
    DEFAULT_TEMPLATE, Document, Generator, JsonSource, MergeOptions, MergeReport, RenderMode,
    TracingReporter,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// JSON file of profiles to merge (use - for stdin)
    #[arg(short, long)]
    pub profiles: String,

    /// Config file to update (default: $AWS_CONFIG_FILE or ~/.aws/config)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Prepended to every generated profile name
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Handlebars template for profile names
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Reference [sso-session] blocks instead of writing credential_process
    #[arg(long)]
    pub no_credential_process: bool,

    /// Executable invoked by credential_process
    #[arg(long, default_value = "granted")]
    pub credential_process_tool: String,

    /// Remove generated profiles for this start URL before writing (repeatable)
    #[arg(long = "prune-start-url")]
    pub prune_start_urls: Vec<String>,

    /// Role regex that wins name collisions, highest priority first (repeatable)
    #[arg(long = "prefer-role")]
    pub prefer_roles: Vec<String>,

    /// Region for profiles that do not carry one
    #[arg(long)]
    pub region: Option<String>,

    /// SSO session assigned to profiles without one
    #[arg(long, default_value = "granted")]
    pub session_name: String,

    /// Registration scope for synthesized SSO sessions (repeatable)
    #[arg(long = "sso-scope", default_value = "sso:account:access")]
    pub sso_scopes: Vec<String>,

    /// Print a diff instead of writing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the merge report as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    pub fn merge_options(&self) -> MergeOptions {
        let mode = if self.no_credential_process {
            RenderMode::SessionReference
        } else {
            RenderMode::CredentialProcess {
                tool: self.credential_process_tool.clone(),
            }
        };

        let mut options = MergeOptions::new()
            .with_template(self.template.as_str())
            .with_mode(mode)
            .with_prefix(self.prefix.as_str())
            .with_session_name(self.session_name.as_str())
            .with_sso_scopes(self.sso_scopes.iter().cloned());
        for url in &self.prune_start_urls {
            options = options.with_prune_start_url(url.as_str());
        }
        for pattern in &self.prefer_roles {
            options = options.with_prefer_role(pattern.as_str());
        }
        if let Some(region) = &self.region {
            options = options.with_default_region(region.as_str());
        }
        options
    }

    fn source(&self) -> Result<JsonSource> {
        if self.profiles == "-" {
            Ok(JsonSource::from_text("stdin", config::read_stdin()?))
        } else {
            Ok(JsonSource::from_path(&self.profiles))
        }
    }
}

/// Merge into the parsed config. The document is only rendered back to text
/// when the merge succeeds.
fn apply(generator: &Generator, doc: &mut Document) -> Result<(String, MergeReport)> {
    let report = generator
        .generate(doc, &TracingReporter)
        .context("failed to merge profiles")?;
    Ok((doc.to_string(), report))
}

fn summary(report: &MergeReport) -> String {
    let mut line = format!(
        "{} profiles, {} sessions",
        report.profiles.len(),
        report.sessions.len()
    );
    if !report.pruned.is_empty() {
        line.push_str(&format!(", {} pruned", report.pruned.len()));
    }
    if !report.skipped.is_empty() {
        line.push_str(&format!(", {} skipped", report.skipped.len()));
    }
    if report.has_duplicates() {
        line.push_str(&format!(", {} duplicated names", report.duplicates.len()));
    }
    line
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let path = config::resolve_config_path(args.config.clone())?;
    let generator = Generator::new(args.merge_options()).with_source(args.source()?);

    let original = config::read_config(&path)?;
    let mut doc = config::parse_config(&original, &path)?;
    let (updated, report) = apply(&generator, &mut doc)?;

    if let Some(diff) = config::commit(&path, &original, &updated, args.dry_run)? {
        // stdout carries the JSON report when --json is set
        if args.json {
            eprint!("{}", diff);
        } else {
            print!("{}", diff);
        }
    }

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialize merge report")?;
        println!("{}", json);
    } else {
        eprintln!("{}: {}", path.display(), summary(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use ssoconfig::{AccountProfile, StaticSource};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: GenerateArgs,
    }

    fn parse(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["ssoconfig"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    fn account(account: &str, role: &str) -> ssoconfig::Profile {
        AccountProfile::new(account, role, "123456789012")
            .with_start_url("https://example.awsapps.com/start", "ap-southeast-2")
            .with_generated_from("aws-sso")
            .into()
    }

    #[test]
    fn test_defaults_match_library_defaults() {
        let args = parse(&["--profiles", "p.json"]);
        assert_eq!(args.merge_options(), MergeOptions::default());
    }

    #[test]
    fn test_flags_map_onto_options() {
        let args = parse(&[
            "--profiles",
            "p.json",
            "--prefix",
            "cf-",
            "--template",
            "{{ AccountID }}",
            "--no-credential-process",
            "--prune-start-url",
            "https://a",
            "--prune-start-url",
            "https://b",
            "--prefer-role",
            "^Admin",
            "--region",
            "eu-west-1",
            "--session-name",
            "company",
            "--sso-scope",
            "sso:account:access",
            "--sso-scope",
            "openid",
        ]);
        let options = args.merge_options();
        assert_eq!(options.prefix, "cf-");
        assert_eq!(options.template, "{{ AccountID }}");
        assert_eq!(options.mode, RenderMode::SessionReference);
        assert_eq!(options.prune_start_urls, vec!["https://a", "https://b"]);
        assert_eq!(options.prefer_roles, vec!["^Admin"]);
        assert_eq!(options.default_region.as_deref(), Some("eu-west-1"));
        assert_eq!(options.session_name, "company");
        assert_eq!(options.sso_scopes, vec!["sso:account:access", "openid"]);
    }

    #[test]
    fn test_custom_credential_process_tool() {
        let args = parse(&["--profiles", "p.json", "--credential-process-tool", "dgranted"]);
        assert_eq!(
            args.merge_options().mode,
            RenderMode::CredentialProcess {
                tool: "dgranted".to_string()
            }
        );
    }

    #[test]
    fn test_apply_renders_merged_document() {
        let generator = Generator::new(MergeOptions::default())
            .with_source(StaticSource::new("fixed", vec![account("prod", "DevRole")]));
        let mut doc = Document::parse("[profile example]\ntest = 1\n").unwrap();

        let (text, report) = apply(&generator, &mut doc).unwrap();
        assert_eq!(report.profiles, vec!["profile prod/DevRole"]);
        assert!(text.starts_with("[profile example]\ntest = 1\n\n[profile prod/DevRole]\n"));
        assert!(text.contains("granted credential-process --profile prod/DevRole"));
    }

    #[test]
    fn test_apply_error_keeps_document() {
        let options = MergeOptions::default().with_template("{{ AccountName }} ");
        let generator = Generator::new(options)
            .with_source(StaticSource::new("fixed", vec![account("prod", "DevRole")]));
        let mut doc = Document::parse("[profile example]\ntest = 1\n").unwrap();

        assert!(apply(&generator, &mut doc).is_err());
        assert_eq!(doc.section_names(), vec!["profile example"]);
    }

    #[test]
    fn test_summary_mentions_duplicates() {
        let generator = Generator::new(MergeOptions::default().with_template("{{ AccountName }}"))
            .with_source(StaticSource::new(
                "fixed",
                vec![account("prod", "DevRole"), account("prod", "Admin")],
            ));
        let mut doc = Document::new();
        let (_, report) = apply(&generator, &mut doc).unwrap();
        assert_eq!(summary(&report), "1 profiles, 0 sessions, 1 duplicated names");
    }
}
