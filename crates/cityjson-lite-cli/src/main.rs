// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `cityjson-load`: load a CityJSON file and print the resulting collections
//! as JSON

mod report;

use anyhow::{bail, Context, Result};
use cityjson_lite_loader::{CityJsonLoader, SemanticColors};
use cityjson_lite_model::{CityModel, LoadFeedback, LoadOptions, LodAs, LodFilter};
use cityjson_lite_parser::{subset_by_extent, subset_by_type, Extent2D, ModelSummary};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

#[derive(Parser, Debug, Clone)]
#[command(name = "cityjson-load", version, about = "Load a CityJSON file into feature collections")]
struct Args {
    /// CityJSON file to load
    input: PathBuf,

    /// EPSG code of the output; defaults to the one in the file metadata
    #[arg(long)]
    epsg: Option<String>,

    /// Copy ancestor attributes onto each object
    #[arg(long, default_value_t = false)]
    keep_parent_attributes: bool,

    /// One collection per city object type
    #[arg(long, default_value_t = false)]
    divide_by_object: bool,

    /// LoD handling: NONE, ATTRIBUTES or LAYERS
    #[arg(long, default_value_t = LodAs::None)]
    lod_as: LodAs,

    /// Load only this LoD
    #[arg(long, default_value = LodFilter::ALL)]
    lod: String,

    /// One feature per semantic surface type
    #[arg(long, default_value_t = false)]
    semantic_surfaces: bool,

    /// Attach a semantic surface style to the collections
    #[arg(long, default_value_t = false)]
    style_semantic_surfaces: bool,

    /// Extra per-polygon semantic keys to read (comma separated)
    #[arg(long, value_delimiter = ',')]
    surface_attributes: Vec<String>,

    /// Keep only these object types (comma separated)
    #[arg(long, value_delimiter = ',')]
    types: Vec<String>,

    /// Keep only objects whose centroid is in MIN_X,MIN_Y,MAX_X,MAX_Y
    #[arg(long, value_delimiter = ',')]
    extent: Option<Vec<f64>>,

    /// Invert the type and extent selections
    #[arg(long, default_value_t = false)]
    invert: bool,

    /// Build features on all cores
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Include every feature in the output, with WKT geometry
    #[arg(long, default_value_t = false)]
    features: bool,

    /// Print the file summary and exit
    #[arg(long, default_value_t = false)]
    info: bool,
}

impl Args {
    fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::new()
            .with_parent_attributes(self.keep_parent_attributes)
            .with_divide_by_object(self.divide_by_object)
            .with_lod_as(self.lod_as)
            .with_lod(LodFilter::parse(&self.lod))
            .with_semantic_surfaces(self.semantic_surfaces)
            .with_semantic_styling(self.style_semantic_surfaces)
            .with_surface_attribute_keys(self.surface_attributes.clone());
        if let Some(epsg) = &self.epsg {
            options = options.with_epsg(epsg.clone());
        }
        options
    }

    fn extent(&self) -> Result<Option<Extent2D>> {
        match self.extent.as_deref() {
            None => Ok(None),
            Some(&[min_x, min_y, max_x, max_y]) => {
                if min_x > max_x || min_y > max_y {
                    bail!("extent minimum exceeds maximum");
                }
                Ok(Some(Extent2D::new(min_x, min_y, max_x, max_y)))
            }
            Some(values) => bail!("extent needs 4 values, got {}", values.len()),
        }
    }
}

/// Feedback sink that reports through the log
#[derive(Default)]
struct LogFeedback {
    last_decile: AtomicU32,
}

impl LoadFeedback for LogFeedback {
    fn set_progress(&self, percent: f32) {
        let decile = (percent / 10.0) as u32;
        if decile > self.last_decile.swap(decile, Ordering::Relaxed) {
            info!("{:.0}%", percent);
        }
    }

    fn push_info(&self, text: &str) {
        info!("{}", text);
    }
}

/// Apply the type and extent selections
fn select_objects(model: CityModel, args: &Args) -> Result<CityModel> {
    let mut model = model;

    if let Some(extent) = args.extent()? {
        model = subset_by_extent(&model, extent, args.invert);
        info!("Found {} objects in extent", model.city_objects.len());
    }
    if !args.types.is_empty() {
        model = subset_by_type(&model, args.types.as_slice(), args.invert);
        info!("Found {} objects of the selected types", model.city_objects.len());
    }
    Ok(model)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let start = Instant::now();

    let model = cityjson_lite_parser::load_file(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    info!("Loaded {} objects", model.city_objects.len());

    if args.info {
        let summary = ModelSummary::from_model(&model);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let model = select_objects(model, &args)?;
    if model.city_objects.is_empty() {
        info!("No objects to load. Skipping!");
        return Ok(());
    }

    let loader = CityJsonLoader::from_path(&model, &args.input)
        .with_options(args.load_options())
        .with_semantic_colors(SemanticColors::default());
    let feedback = LogFeedback::default();

    let output = if args.parallel {
        loader.load_parallel(&feedback)
    } else {
        loader.load(&feedback)
    }
    .context("load failed")?;

    info!("Done in {:.2?}", start.elapsed());

    let report = report::LoadReport::new(&output, args.features);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
