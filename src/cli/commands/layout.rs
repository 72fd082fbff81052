//! Layout command implementation

use serde::Serialize;

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::condvec::ColumnLayout;
use crate::config::{load_config, load_dataset, LayoutArgs, OutputFormat};
use crate::data::{DataPrep, DataTransformer};

/// Layout block annotated with the source column it came from
#[derive(Debug, Serialize)]
pub struct NamedBlock {
    pub source: String,
    pub categories: Vec<String>,
    pub start_offset: usize,
    pub data_offset: usize,
    pub probability_mass: Vec<f64>,
    pub log_probability_mass: Vec<f64>,
}

/// Pair each layout block with its source column and category labels
///
/// Softmax spans come from categorical columns and from the mode part of
/// mixed columns, in column order.
pub fn name_blocks(prep: &DataPrep, layout: &ColumnLayout) -> Vec<NamedBlock> {
    let types = prep.column_types();
    let sources = prep.columns().iter().enumerate().filter_map(|(i, name)| {
        if types.is_categorical(i) {
            let labels = prep.labels(i).map(<[String]>::to_vec).unwrap_or_default();
            Some((name.clone(), labels))
        } else {
            types.mixed.get(&i).map(|modes| {
                let mut labels: Vec<String> = modes.iter().map(|m| format!("={m}")).collect();
                labels.push("continuous".to_string());
                (format!("{name} (modes)"), labels)
            })
        }
    });

    layout
        .columns()
        .iter()
        .zip(sources)
        .map(|(col, (source, categories))| NamedBlock {
            source,
            categories,
            start_offset: col.start_offset,
            data_offset: col.data_offset,
            probability_mass: col.probability_mass.clone(),
            log_probability_mass: col.log_probability_mass.clone(),
        })
        .collect()
}

pub fn format_text(blocks: &[NamedBlock], layout: &ColumnLayout) -> String {
    let mut lines = vec![format!(
        "Conditioning layout: {} columns, {} options, row width {}",
        layout.n_columns(),
        layout.n_options(),
        layout.data_width()
    )];
    for block in blocks {
        lines.push(format!(
            "  {} @ cond {} / data {}",
            block.source, block.start_offset, block.data_offset
        ));
        for (i, label) in block.categories.iter().enumerate() {
            let raw = block.probability_mass.get(i).copied().unwrap_or(0.0);
            let log = block.log_probability_mass.get(i).copied().unwrap_or(0.0);
            lines.push(format!("    {label:<20} raw {raw:.4}  log {log:.4}"));
        }
    }
    lines.join("\n")
}

pub fn run_layout(args: LayoutArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Verbose,
        &format!("Loading config: {}", args.config.display()),
    );

    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let frame = load_dataset(&spec).map_err(|e| format!("Data error: {e}"))?;

    let prep = DataPrep::new(&frame, &spec.data, spec.training.seed.unwrap_or(0))
        .map_err(|e| format!("Data error: {e}"))?;
    let transformer = DataTransformer::fit(prep.values(), prep.column_types())
        .map_err(|e| format!("Transformer error: {e}"))?;
    let layout = transformer
        .transform(prep.values())
        .and_then(|data| transformer.layout(&data))
        .map_err(|e| format!("Layout error: {e}"))?;

    let blocks = name_blocks(&prep, &layout);
    match args.format {
        OutputFormat::Text => log(level, LogLevel::Normal, &format_text(&blocks, &layout)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&blocks)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            println!("{json}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataSpec;
    use crate::data::TabularFrame;
    use std::collections::BTreeMap;

    fn fixture() -> (DataPrep, ColumnLayout) {
        let frame = TabularFrame::from_csv_str(
            "loss,color,price\n0,red,1\n5,blue,2\n0,red,3\n7,red,4\n",
        )
        .unwrap();
        let spec = DataSpec {
            test_ratio: 0.0,
            categorical_columns: vec!["color".into()],
            mixed_columns: BTreeMap::from([("loss".to_string(), vec![0.0])]),
            ..Default::default()
        };
        let prep = DataPrep::new(&frame, &spec, 0).unwrap();
        let t = DataTransformer::fit(prep.values(), prep.column_types()).unwrap();
        let layout = t.layout(&t.transform(prep.values()).unwrap()).unwrap();
        (prep, layout)
    }

    #[test]
    fn test_name_blocks_follow_column_order() {
        let (prep, layout) = fixture();
        let blocks = name_blocks(&prep, &layout);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].source, "loss (modes)");
        assert_eq!(blocks[0].categories, vec!["=0", "continuous"]);
        assert_eq!(blocks[1].source, "color");
        assert_eq!(blocks[1].categories, vec!["blue", "red"]);
        assert!((blocks[1].probability_mass[1] - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_format_text_lists_every_category() {
        let (prep, layout) = fixture();
        let text = format_text(&name_blocks(&prep, &layout), &layout);
        assert!(text.contains("2 columns, 4 options"));
        assert!(text.contains("blue"));
        assert!(text.contains("continuous"));
    }
}
