//! Verify command implementation.

use crate::cli::{PresetArg, VerifyArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::EXIT_GATE_FAILED;
use citegate_domain::traits::AuthorityVerifier;
use citegate_domain::{CitationAssertion, RawCitationFragment};
use citegate_extractor::{fragments_from_strings, parse_eyecite_output};
use citegate_gatekeeper::Gatekeeper;
use citegate_pipeline::{CitationPipeline, PipelineConfig, PipelineOutput, ResearchContext, VerificationRequest};
use citegate_verifier::{CourtListenerClient, FixtureAuthorityVerifier, OllamaHoldingVerifier};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Execute the verify command; returns the process exit code.
pub fn execute_verify(args: VerifyArgs, config: &Config, formatter: &Formatter) -> Result<i32> {
    let output = run_verify(&args, config)?;
    println!("{}", formatter.format_output(&output)?);
    Ok(if output.passes_hard_gate { 0 } else { EXIT_GATE_FAILED })
}

/// Load inputs, build collaborators and run the pipeline once.
///
/// With `--authorities` every lookup is answered from the fixture and no
/// network service is contacted. Otherwise CourtListener serves both the
/// primary lookups and the secondary search fallback.
pub fn run_verify(args: &VerifyArgs, config: &Config) -> Result<PipelineOutput> {
    let request = build_request(args)?;
    let pipeline_config = pipeline_config(args.preset, config);
    let gatekeeper = Gatekeeper::new(config.validation.clone())?;

    let holding = if config.holding.enabled {
        info!("Holding verification enabled with model {}", config.holding.model);
        Some(
            OllamaHoldingVerifier::new(&config.holding.endpoint, &config.holding.model)?
                .with_max_retries(config.holding.max_retries),
        )
    } else {
        None
    };

    match &args.authorities {
        Some(path) => {
            let fixture = FixtureAuthorityVerifier::from_file(path)?;
            info!("Answering lookups from {} fixture records", fixture.len());
            let pipeline = CitationPipeline::new(fixture, gatekeeper, pipeline_config);
            execute(pipeline, holding, &request)
        }
        None => {
            let token = config.authority_token();
            if token.is_none() {
                warn!(
                    "{} is not set; CourtListener requests are unauthenticated",
                    config.authority.token_env
                );
            }
            let primary = CourtListenerClient::new(&config.authority.endpoint, token.clone())?;
            let mut pipeline = CitationPipeline::new(primary, gatekeeper, pipeline_config);
            if pipeline.config().secondary_lookups {
                let secondary = CourtListenerClient::new(&config.authority.endpoint, token)?;
                pipeline = pipeline.with_secondary_source(secondary);
            }
            execute(pipeline, holding, &request)
        }
    }
}

fn execute<A>(
    pipeline: CitationPipeline<A>,
    holding: Option<OllamaHoldingVerifier>,
    request: &VerificationRequest,
) -> Result<PipelineOutput>
where
    A: AuthorityVerifier + Send + Sync + 'static,
    A::Error: Display,
{
    let pipeline = match holding {
        Some(verifier) => pipeline.with_holding_verifier(verifier),
        None => pipeline,
    };

    // The HTTP collaborators are blocking clients; they are built and
    // dropped here, outside the runtime's async context.
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let output = runtime.block_on(pipeline.run(request));
    drop(pipeline);
    Ok(output)
}

/// Pipeline settings after applying a command-line preset.
pub fn pipeline_config(preset: Option<PresetArg>, config: &Config) -> PipelineConfig {
    match preset {
        None => config.pipeline.clone(),
        Some(PresetArg::Standard) => PipelineConfig::default(),
        Some(PresetArg::Aggressive) => PipelineConfig::aggressive(),
        Some(PresetArg::Lenient) => PipelineConfig::lenient(),
    }
}

/// Read every input file named on the command line into a request.
pub fn build_request(args: &VerifyArgs) -> Result<VerificationRequest> {
    let draft = fs::read_to_string(&args.draft)?;
    let fragments = load_fragments(&draft, &args.citations)?;

    let research = match &args.research {
        Some(path) => serde_json::from_str::<ResearchContext>(&fs::read_to_string(path)?)?,
        None => ResearchContext::default(),
    };
    let assertions = match &args.assertions {
        Some(path) => serde_json::from_str::<Vec<CitationAssertion>>(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    Ok(VerificationRequest::new(draft, fragments)
        .with_assertions(assertions)
        .with_research(research)
        .with_audit(args.tier.clone(), args.phase.clone()))
}

/// Citation fragments from a file holding either eyecite output or a plain
/// JSON array of citation strings.
pub fn load_fragments(draft: &str, path: &Path) -> Result<Vec<RawCitationFragment>> {
    let json = fs::read_to_string(path)?;
    if json.trim_start().starts_with('[') {
        let strings: Vec<String> = serde_json::from_str(&json)
            .map_err(|e| CliError::InvalidInput(format!("{}: expected an array of strings: {}", path.display(), e)))?;
        return Ok(fragments_from_strings(draft, &strings));
    }
    Ok(parse_eyecite_output(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_preset_overrides_config() {
        let mut config = Config::default();
        config.pipeline.batch_size = 7;
        assert_eq!(pipeline_config(None, &config).batch_size, 7);
        assert_eq!(pipeline_config(Some(PresetArg::Aggressive), &config), PipelineConfig::aggressive());
        assert_eq!(pipeline_config(Some(PresetArg::Standard), &config), PipelineConfig::default());
    }

    #[test]
    fn test_load_fragments_from_strings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cites.json");
        fs::write(&path, r#"["100 F.3d 200", "Id."]"#).unwrap();

        let draft = "See 100 F.3d 200. Id. at 5.";
        let fragments = load_fragments(draft, &path).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "100 F.3d 200");
        assert_eq!(fragments[0].start, 4);
    }

    #[test]
    fn test_load_fragments_from_eyecite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cites.json");
        fs::write(
            &path,
            r#"{"citations": [{"raw": "100 F.3d 200", "citation_type": "FULL_CASE", "span": [4, 16]}]}"#,
        )
        .unwrap();

        let fragments = load_fragments("See 100 F.3d 200.", &path).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].end, 16);
    }

    #[test]
    fn test_eyecite_tool_error_surfaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cites.json");
        fs::write(&path, r#"{"error": "eyecite not installed"}"#).unwrap();
        assert!(matches!(load_fragments("", &path), Err(CliError::Extractor(_))));
    }
}
