mod config;
mod provenance;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use geo::{Geometry, MultiPoint};
use geosafe::api::{
    area, buffer, diagnose, fix_geometry, generate_lloyd_points_geographic_with, length_of,
    make_point, PreparedOperand, SeedToken,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

use config::CliConfig;
use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "geosafe-cli")]
#[command(about = "Metric and fail-soft boolean operations on lon/lat geometry files")]
struct Cmd {
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file with `buffer`, `safe_ops` and `relax` tunables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print the area in square meters
    Area {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the total length in meters of the linear parts
    Length {
        #[arg(long)]
        input: PathBuf,
    },
    /// Buffer by a distance in meters (negative erodes)
    Buffer {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        meters: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the first topology defect, if any
    Validate {
        #[arg(long)]
        input: PathBuf,
    },
    /// Normalize and repair; an unrepairable geometry is written unchanged
    Repair {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Boolean operation of two geometries with repair and retry
    Overlay {
        #[arg(long, value_enum)]
        op: OverlayOp,
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Fill an area with Lloyd-relaxed points at a spacing in meters
    Lloyd {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        spacing: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OverlayOp {
    Intersection,
    Union,
    Difference,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = match cmd.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    let cfg = CliConfig::load(cmd.config.as_deref())?;
    let printed = match cmd.action {
        Action::Area { input } => Some(measure_area(&input)?),
        Action::Length { input } => Some(measure_length(&input)?),
        Action::Buffer { input, meters, out } => {
            run_buffer(&input, meters, &out, &cfg)?;
            None
        }
        Action::Validate { input } => Some(validate(&input)?),
        Action::Repair { input, out } => {
            run_repair(&input, &out)?;
            None
        }
        Action::Overlay { op, a, b, out } => {
            run_overlay(op, &a, &b, &out, &cfg)?;
            None
        }
        Action::Lloyd {
            input,
            spacing,
            seed,
            out,
        } => {
            run_lloyd(&input, spacing, seed, &out, &cfg)?;
            None
        }
        Action::Report => Some(report()),
    };
    if let Some(v) = printed {
        println!("{}", serde_json::to_string_pretty(&v)?);
    }
    Ok(())
}

fn read_geometry(path: &Path) -> Result<Geometry<f64>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing geometry {}", path.display()))
}

#[track_caller]
fn write_geometry(out: &Path, g: &Geometry<f64>, payload: Payload) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out, serde_json::to_vec_pretty(g)?)
        .with_context(|| format!("writing {}", out.display()))?;
    let prov = write_sidecar(out, payload)?;
    tracing::info!(out = %out.display(), provenance = %prov.display(), "wrote");
    Ok(())
}

fn measure_area(input: &Path) -> Result<Value> {
    let g = read_geometry(input)?;
    Ok(json!({ "area_m2": area(&g) }))
}

fn measure_length(input: &Path) -> Result<Value> {
    let g = read_geometry(input)?;
    Ok(json!({ "length_m": length_of(&g) }))
}

fn run_buffer(input: &Path, meters: f64, out: &Path, cfg: &CliConfig) -> Result<()> {
    if !meters.is_finite() {
        bail!("buffer distance must be finite, got {meters}");
    }
    let g = read_geometry(input)?;
    tracing::info!(meters, style = ?cfg.buffer, "buffer");
    let buffered = buffer(&g, meters, &cfg.buffer);
    let params = json!({ "meters": meters, "style": cfg.buffer });
    let payload = Payload::new("buffer", params).with_input(input);
    write_geometry(out, &buffered, payload)
}

fn validate(input: &Path) -> Result<Value> {
    let g = read_geometry(input)?;
    Ok(match diagnose(&g) {
        None => json!({ "valid": true }),
        Some(err) => json!({
            "valid": false,
            "kind": err.kind,
            "location": err.location,
            "message": err.message,
        }),
    })
}

fn run_repair(input: &Path, out: &Path) -> Result<()> {
    let g = read_geometry(input)?;
    let before = diagnose(&g).map(|e| e.kind);
    let fixed = fix_geometry(&geosafe::topology::normalize(&g));
    let after = diagnose(&fixed).map(|e| e.kind);
    tracing::info!(?before, ?after, "repair");
    let params = json!({ "defect_before": before, "defect_after": after });
    let payload = Payload::new("repair", params).with_input(input);
    write_geometry(out, &fixed, payload)
}

fn run_overlay(op: OverlayOp, a: &Path, b: &Path, out: &Path, cfg: &CliConfig) -> Result<()> {
    let ga = read_geometry(a)?;
    let gb = read_geometry(b)?;
    let prepared = PreparedOperand::with_cfg(&ga, cfg.safe_ops);
    let result = match op {
        OverlayOp::Intersection => prepared.intersection(&gb),
        OverlayOp::Union => prepared.union(&gb),
        OverlayOp::Difference => prepared.difference(&gb),
    };
    let payload = Payload::new(
        "overlay",
        json!({ "op": format!("{op:?}").to_lowercase(), "safe_ops": cfg.safe_ops }),
    )
    .with_input(a)
    .with_input(b);
    write_geometry(out, &result, payload)
}

fn run_lloyd(input: &Path, spacing: f64, seed: u64, out: &Path, cfg: &CliConfig) -> Result<()> {
    let g = read_geometry(input)?;
    let token = SeedToken::new(seed, 0);
    let mut rng = token.to_rng();
    let points = generate_lloyd_points_geographic_with(&g, spacing, cfg.relax, &mut rng)?;
    tracing::info!(count = points.len(), spacing, seed, "lloyd");
    let mp = Geometry::MultiPoint(MultiPoint::new(points.into_iter().map(make_point).collect()));
    let payload = Payload::new(
        "lloyd",
        json!({ "spacing": spacing, "token": token, "relax": cfg.relax }),
    )
    .with_input(input);
    write_geometry(out, &mp, payload)
}

fn report() -> Value {
    provenance::document(&Payload::new("report", json!({})), &[])
}
