//! The newsletter run, start to finish
//!
//! Config and template, editorial text, both tariff datasets, tariff
//! extraction, rendering, then a single write of the output document.
//! Every step runs in sequence and any error aborts before the write.

use crate::{
    config::{load_config, Config, Paths},
    editorial::{edito_html, load_edito},
    error::Result,
    open_data::{DatasetTable, OpenDataClient},
    render::{format_timestamp, load_template, render, write_output, RenderContext},
    tariff::{pick_surplus_tariff, TARIFF_PLACEHOLDER},
};
use chrono::Utc;
use std::path::PathBuf;
use tracing::info;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output: PathBuf,
    /// `None` when the placeholder was rendered instead
    pub tariff: Option<String>,
    pub cre_last_metro: Option<String>,
    pub cre_last_zni: Option<String>,
}

pub async fn generate(paths: &Paths) -> Result<GenerationReport> {
    let cfg = load_config(&paths.config)?;
    let template = load_template(&paths.template).await?;
    info!(config = %paths.config.display(), template = %paths.template.display(), "Loaded configuration and template");

    let edito = load_edito(&paths.edito).await?;

    let client = OpenDataClient::new(&cfg.open_data)?;
    let (metro, zni) = fetch_datasets(&client, &cfg).await?;

    let tariff = pick_surplus_tariff(metro.table.as_ref());
    match &tariff {
        Some(value) => info!(tariff = %value, "Extracted surplus tariff"),
        None => info!("No surplus tariff found, using placeholder"),
    }

    let now = format_timestamp(Utc::now(), cfg.tz()?);
    let ctx = RenderContext::new(
        &cfg,
        now,
        edito_html(edito.as_deref()),
        metro.dataset.last_modified.clone(),
        zni.dataset.last_modified.clone(),
        tariff.clone().unwrap_or_else(|| TARIFF_PLACEHOLDER.to_string()),
    );
    let html = render(&template, &ctx);

    write_output(&paths.output, &html).await?;
    info!(output = %paths.output.display(), bytes = html.len(), "Newsletter written");

    Ok(GenerationReport {
        output: paths.output.clone(),
        tariff,
        cre_last_metro: metro.dataset.last_modified,
        cre_last_zni: zni.dataset.last_modified,
    })
}

/// Metropole then ZNI; a slug configured twice is fetched once
async fn fetch_datasets(client: &OpenDataClient, cfg: &Config) -> Result<(DatasetTable, DatasetTable)> {
    let metro = client.read_dataset_table(&cfg.open_data.metropole_slug).await?;

    let zni = if cfg.open_data.zni_slug == cfg.open_data.metropole_slug {
        metro.clone()
    } else {
        client.read_dataset_table(&cfg.open_data.zni_slug).await?
    };

    Ok((metro, zni))
}
