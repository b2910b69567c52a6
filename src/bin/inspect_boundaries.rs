use anyhow::{bail, Context};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;

use geoscatter::boundary::{BoundarySource, GeoJsonSource, ShapefileSource, DEFAULT_CODE_ATTRIBUTE};

/// Print the region codes, feature counts and bounding boxes of a boundary file
#[derive(Parser, Debug)]
#[command(name = "inspect_boundaries")]
struct Args {
    /// Shapefile (.shp) or GeoJSON (.geojson/.json) boundary file
    path: PathBuf,

    /// Attribute holding the region code
    #[arg(long, default_value = DEFAULT_CODE_ATTRIBUTE)]
    code_attribute: String,

    /// Only list codes containing this substring (case-insensitive)
    #[arg(long)]
    filter: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let ext = args
        .path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let source: Box<dyn BoundarySource> = match ext.as_str() {
        "shp" => Box::new(ShapefileSource::new(args.path.clone(), &args.code_attribute)),
        "geojson" | "json" => Box::new(GeoJsonSource::new(args.path.clone(), &args.code_attribute)),
        other => bail!("Unsupported boundary file extension: {:?}", other),
    };

    println!("Inspecting {}", source.describe());
    let geometry = source
        .load()
        .with_context(|| format!("Failed to load {}", args.path.display()))?;

    println!("\n=== SUMMARY ===");
    println!("  countries:  {}", geometry.countries.len());
    println!("  coastlines: {}", geometry.coastlines.len());

    // code -> (features, polygons, [min_lon, min_lat, max_lon, max_lat])
    let mut codes: BTreeMap<String, (usize, usize, [f64; 4])> = BTreeMap::new();
    for country in &geometry.countries {
        let entry = codes.entry(country.code.clone()).or_insert((
            0,
            0,
            [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
        ));
        entry.0 += 1;
        entry.1 += country.geometry.0.len();
        if let Some(rect) = country.bounds() {
            entry.2[0] = entry.2[0].min(rect.min().x);
            entry.2[1] = entry.2[1].min(rect.min().y);
            entry.2[2] = entry.2[2].max(rect.max().x);
            entry.2[3] = entry.2[3].max(rect.max().y);
        }
    }

    let filter = args.filter.map(|f| f.to_ascii_lowercase());
    println!("\n=== REGIONS ({}) ===", args.code_attribute);
    for (code, (features, polygons, bbox)) in &codes {
        if let Some(f) = &filter {
            if !code.to_ascii_lowercase().contains(f) {
                continue;
            }
        }
        let label = if code.is_empty() { "<none>" } else { code.as_str() };
        if bbox[0].is_finite() {
            println!(
                "  {:<8} features={:<3} polygons={:<5} extent=[{:.2}, {:.2}, {:.2}, {:.2}]",
                label, features, polygons, bbox[0], bbox[2], bbox[1], bbox[3]
            );
        } else {
            println!("  {:<8} features={:<3} polygons={:<5} (empty)", label, features, polygons);
        }
    }

    Ok(())
}
