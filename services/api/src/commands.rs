use crate::infra::{build_service, ScoringService};
use clap::Args;
use portability_score::config::AppConfig;
use portability_score::error::AppError;
use portability_score::portability::{
    AnalysisReport, AnalyzeRequest, BenchmarkPosition, QuickEstimateReport, QuickEstimateRequest,
    RawValue, RegionGroup,
};
use serde::Serialize;
use std::fmt::Write as _;

/// Graded factors as entered on the form. Out-of-range values are clamped and reported.
#[derive(Args, Debug)]
pub(crate) struct GradeArgs {
    /// AUM diversification, 1 (single pocket) to 5 (broad mix)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) aum_mix: f64,
    /// Cross-border licences held, 0 to 3
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) cross_border_licenses: f64,
    /// Product scope, 1 (narrow) to 4 (full shelf)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) product_scope: f64,
    /// Client concentration, 1 (diversified) to 5 (top-heavy)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) client_concentration: f64,
    /// KYC portability, 0 (none reusable) to 3 (fully standardized)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) kyc_portability: f64,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Market identifier, e.g. uae_dubai
    #[arg(long)]
    pub(crate) market: String,
    /// Booking centre serving the book; repeat for several
    #[arg(long = "centre")]
    pub(crate) centres: Vec<String>,
    #[command(flatten)]
    pub(crate) grades: GradeArgs,
    /// Print the HTTP response body instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct QuickArgs {
    /// Market identifier, e.g. uk_london
    #[arg(long)]
    pub(crate) market: String,
    #[command(flatten)]
    pub(crate) grades: GradeArgs,
    /// Print the HTTP response body instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct MarketsArgs {
    /// Only list one region (CH, UK, EU, NORDICS, MEA, LATAM, ASIA, CEE, US)
    #[arg(long)]
    pub(crate) region: Option<String>,
    /// List booking centres and their multipliers instead of markets
    #[arg(long)]
    pub(crate) centres: bool,
}

impl ScoreArgs {
    fn to_request(&self) -> AnalyzeRequest {
        AnalyzeRequest {
            market_id: Some(self.market.clone()),
            booking_centres: Some(self.centres.clone()),
            aum_mix: Some(RawValue::Number(self.grades.aum_mix)),
            cross_border_licenses: Some(RawValue::Number(self.grades.cross_border_licenses)),
            product_scope: Some(RawValue::Number(self.grades.product_scope)),
            client_concentration: Some(RawValue::Number(self.grades.client_concentration)),
            kyc_portability: Some(RawValue::Number(self.grades.kyc_portability)),
        }
    }
}

impl QuickArgs {
    fn to_request(&self) -> QuickEstimateRequest {
        QuickEstimateRequest {
            market_id: Some(self.market.clone()),
            aum_mix: Some(RawValue::Number(self.grades.aum_mix)),
            cross_border_licenses: Some(RawValue::Number(self.grades.cross_border_licenses)),
            product_scope: Some(RawValue::Number(self.grades.product_scope)),
            client_concentration: Some(RawValue::Number(self.grades.client_concentration)),
            kyc_portability: Some(RawValue::Number(self.grades.kyc_portability)),
        }
    }
}

fn load_service() -> Result<ScoringService, AppError> {
    let config = AppConfig::load()?;
    Ok(build_service(&config.registry)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let body = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{body}");
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let service = load_service()?;
    let report = service
        .analyze(&args.to_request())
        .map_err(|err| AppError::Input(err.to_string()))?;

    if args.json {
        print_json(&report)
    } else {
        print!("{}", render_report(&report));
        Ok(())
    }
}

pub(crate) fn run_quick(args: QuickArgs) -> Result<(), AppError> {
    let service = load_service()?;
    let report = service
        .quick_estimate(&args.to_request())
        .map_err(|err| AppError::Input(err.to_string()))?;

    if args.json {
        print_json(&report)
    } else {
        print!("{}", render_quick_estimate(&report));
        Ok(())
    }
}

pub(crate) fn run_markets(args: MarketsArgs) -> Result<(), AppError> {
    let service = load_service()?;
    let registry = service.engine().registry();

    if args.centres {
        println!("Booking centres");
        for centre in registry.booking_centres() {
            let tier = if centre.tier1 { " (tier-1)" } else { "" };
            println!("- {}: {:.2}{tier}", centre.name, centre.multiplier);
        }
        return Ok(());
    }

    let groups: Vec<RegionGroup<'_>> = registry
        .markets_by_region()
        .into_iter()
        .filter(|group| match &args.region {
            Some(code) => group.region.code().eq_ignore_ascii_case(code.trim()),
            None => true,
        })
        .collect();
    if groups.is_empty() {
        let region = args.region.unwrap_or_default();
        return Err(AppError::Input(format!("Unknown region '{region}'.")));
    }
    print!("{}", render_markets(&groups));
    Ok(())
}

fn position_label(position: BenchmarkPosition) -> &'static str {
    match position {
        BenchmarkPosition::BelowMedian => "below median",
        BenchmarkPosition::AtOrAboveMedian => "at or above median",
        BenchmarkPosition::TopQuartile => "top quartile",
    }
}

pub(crate) fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Portability score for {}: {}/100 ({})",
        report.market.label,
        report.score,
        report.band.label()
    );
    let _ = writeln!(out, "{}", report.headline);
    let _ = writeln!(out, "Next step: {}", report.next_step);
    let _ = writeln!(out, "Regulator: {}", report.market.regulator);

    match (&report.benchmark, report.position) {
        (Some(benchmark), Some(position)) => {
            let _ = writeln!(
                out,
                "Benchmark: median {} | top quartile {} ({})",
                benchmark.median,
                benchmark.top_quartile,
                position_label(position)
            );
            for note in &benchmark.notes {
                let _ = writeln!(out, "  note: {note}");
            }
        }
        _ => {
            let _ = writeln!(out, "Benchmark: unavailable for this market");
        }
    }

    if !report.adjustments.is_empty() {
        let _ = writeln!(out, "Adjusted inputs:");
        for adjustment in &report.adjustments {
            let _ = writeln!(
                out,
                "  - {}: {} -> {}",
                adjustment.field, adjustment.received, adjustment.applied
            );
        }
    }

    if report.recommendations.is_empty() {
        let _ = writeln!(out, "Recommendations: none");
    } else {
        let _ = writeln!(out, "Recommendations:");
        for recommendation in &report.recommendations {
            let _ = writeln!(out, "  - {recommendation}");
        }
    }

    let _ = writeln!(out, "Score components:");
    for component in &report.components {
        let _ = writeln!(
            out,
            "  - {}: raw {} | weight {:.2} | contribution {:.3}",
            component.factor.field_name(),
            component.raw,
            component.weight,
            component.contribution
        );
    }
    out
}

pub(crate) fn render_quick_estimate(report: &QuickEstimateReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Quick estimate for {}: {}/100 ({})",
        report.market_id,
        report.score,
        report.band.label()
    );
    let _ = writeln!(out, "{}", report.headline);
    let _ = writeln!(
        out,
        "Market factor {:.2} stands in for booking centres; run `score` for the full analysis.",
        report.market_factor
    );
    for adjustment in &report.adjustments {
        let _ = writeln!(
            out,
            "  adjusted {}: {} -> {}",
            adjustment.field, adjustment.received, adjustment.applied
        );
    }
    out
}

pub(crate) fn render_markets(groups: &[RegionGroup<'_>]) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{} ({} markets)", group.region.code(), group.markets.len());
        for market in &group.markets {
            let _ = writeln!(
                out,
                "  - {} | {} | {} | factor {:.2}",
                market.id, market.label, market.regulator, market.market_factor
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use portability_score::config::RegistryConfig;

    fn grades(values: [f64; 5]) -> GradeArgs {
        let [aum_mix, cross_border_licenses, product_scope, client_concentration, kyc_portability] =
            values;
        GradeArgs {
            aum_mix,
            cross_border_licenses,
            product_scope,
            client_concentration,
            kyc_portability,
        }
    }

    fn service() -> ScoringService {
        build_service(&RegistryConfig::default()).expect("service builds")
    }

    #[test]
    fn score_report_lists_benchmark_and_recommendations() {
        let args = ScoreArgs {
            market: "uae_dubai".to_string(),
            centres: vec!["Dubai (DIFC)".to_string(), "Geneva".to_string()],
            grades: grades([3.0, 1.0, 2.0, 3.0, 1.0]),
            json: false,
        };

        let report = service()
            .analyze(&args.to_request())
            .expect("analysis succeeds");
        let text = render_report(&report);

        assert!(text.starts_with("Portability score for UAE"));
        assert!(text.contains("52/100 (low)"));
        assert!(text.contains("Benchmark: median 73 | top quartile 86 (below median)"));
        assert!(text.contains("  - Additional cross-border coverage"));
        assert!(text.contains("Next step: You likely need a mitigation plan"));
        assert!(!text.contains("Adjusted inputs"));
    }

    #[test]
    fn clamped_cli_values_are_echoed() {
        let args = ScoreArgs {
            market: "uk_london".to_string(),
            centres: vec!["London".to_string()],
            grades: grades([8.0, 1.0, 2.0, 3.0, 1.0]),
            json: false,
        };

        let report = service()
            .analyze(&args.to_request())
            .expect("analysis succeeds");

        assert!(render_report(&report).contains("  - aumMix: 8 -> 5"));
    }

    #[test]
    fn empty_centres_surface_the_intake_message() {
        let args = ScoreArgs {
            market: "uk_london".to_string(),
            centres: Vec::new(),
            grades: grades([3.0, 1.0, 2.0, 3.0, 1.0]),
            json: false,
        };

        let err = service()
            .analyze(&args.to_request())
            .map_err(|err| AppError::Input(err.to_string()))
            .expect_err("empty centres rejected");

        assert_eq!(err.to_string(), "Select at least one booking centre.");
    }

    #[test]
    fn quick_estimate_mentions_the_market_factor() {
        let args = QuickArgs {
            market: "uae_dubai".to_string(),
            grades: grades([3.0, 3.0, 4.0, 1.0, 3.0]),
            json: false,
        };

        let report = service()
            .quick_estimate(&args.to_request())
            .expect("estimate succeeds");
        let text = render_quick_estimate(&report);

        assert!(text.contains("uae_dubai: 88/100 (high)"));
        assert!(text.contains("Market factor 0.90"));
    }

    #[test]
    fn markets_render_by_region() {
        let service = service();
        let groups = service.engine().registry().markets_by_region();

        let text = render_markets(&groups);

        assert!(text.starts_with("CH (3 markets)"));
        assert!(text.contains("  - uae_dubai | UAE — Dubai (DIFC) | DFSA | factor 0.90"));
    }
}
