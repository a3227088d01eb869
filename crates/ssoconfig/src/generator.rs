use crate::error::{Error, Result};
use crate::merge::merge;
use crate::options::MergeOptions;
use crate::profile::Profile;
use crate::report::{MergeReport, Reporter};
use crate::source::Source;
use ssoconfig_ini::Document;

/// Fetches profiles from every source and merges them into a config document.
///
/// # Example
///
/// ```
/// use ssoconfig::{AccountProfile, Document, Generator, MergeOptions, NullReporter, StaticSource};
///
/// let profile = AccountProfile::new("prod", "DevRole", "123456789012")
///     .with_start_url("https://example.awsapps.com/start", "us-east-1")
///     .with_generated_from("aws-sso");
///
/// let generator = Generator::new(MergeOptions::default())
///     .with_source(StaticSource::new("fixed", vec![profile.into()]));
///
/// let mut doc: Document = "[profile example]\ntest = 1\n".parse()?;
/// let report = generator.generate(&mut doc, &NullReporter)?;
///
/// assert_eq!(report.profiles, vec!["profile prod/DevRole"]);
/// assert!(doc.contains_section("profile example"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Generator {
    sources: Vec<Box<dyn Source>>,
    options: MergeOptions,
}

impl Generator {
    pub fn new(options: MergeOptions) -> Self {
        Self {
            sources: Vec::new(),
            options,
        }
    }

    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Fetch from each source in order. The first failing source aborts the
    /// run; nothing is retried.
    pub fn fetch(&self, reporter: &dyn Reporter) -> Result<Vec<Profile>> {
        let mut profiles = Vec::new();
        for source in &self.sources {
            let fetched = source.fetch_profiles().map_err(|source_err| Error::Source {
                source_name: source.name().to_string(),
                source: source_err,
            })?;
            reporter.debug(&format!(
                "fetched {} profiles from {}",
                fetched.len(),
                source.name()
            ));
            profiles.extend(fetched);
        }
        Ok(profiles)
    }

    pub fn generate(&self, doc: &mut Document, reporter: &dyn Reporter) -> Result<MergeReport> {
        let profiles = self.fetch(reporter)?;
        merge(doc, &profiles, &self.options, reporter)
    }
}
