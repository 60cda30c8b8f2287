//! Validate a detection recording.

use std::collections::BTreeMap;
use std::path::PathBuf;

use steadybox_detection_model::detection::{class_summary, parse_frames};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating recording at: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let frames = parse_frames(&content)?;

    let mut issues = Vec::new();
    let mut classes: BTreeMap<String, usize> = BTreeMap::new();
    let mut detections = 0usize;
    let mut empty_frames = 0usize;
    let mut previous = None;

    for frame in &frames {
        if let Some(prev) = previous {
            if frame.index <= prev {
                issues.push(format!(
                    "frame {} does not follow frame {prev}",
                    frame.index
                ));
            }
        }
        previous = Some(frame.index);

        if frame.is_empty() {
            empty_frames += 1;
        }
        detections += frame.detections.len();

        for (i, d) in frame.detections.iter().enumerate() {
            if !d.bbox.is_well_formed() {
                issues.push(format!(
                    "frame {} detection {i}: degenerate box {:?}",
                    frame.index,
                    d.bbox.coords()
                ));
            }
            if !(0.0..=1.0).contains(&d.confidence) {
                issues.push(format!(
                    "frame {} detection {i}: confidence {} outside [0, 1]",
                    frame.index, d.confidence
                ));
            }
        }
        for (name, count) in class_summary(&frame.detections) {
            *classes.entry(name.to_string()).or_insert(0) += count;
        }
    }

    println!("  Frames: {}", frames.len());
    println!("  Empty frames: {empty_frames}");
    println!("  Detections: {detections}");
    for (name, count) in &classes {
        println!("    {name}: {count}");
    }

    if issues.is_empty() {
        println!("\nRecording is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. The tracker tolerates them, but output may be degraded.",
            issues.len()
        );
    }

    Ok(())
}
