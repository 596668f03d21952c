//! Voxstamp CLI - paste, split, and inspect voxel structures
//!
//! Usage:
//!   voxstamp paste --world <DIR> --structure <FILE> --at <X,Y,Z> [OPTIONS]
//!   voxstamp split --structure <FILE> --out <DIR> [OPTIONS]
//!   voxstamp bounds --structure <FILE>
//!   voxstamp count --world <DIR> --dimension <NAME> --min <X,Y,Z> --max <X,Y,Z>
//!   voxstamp init --world <DIR> --name <NAME> [--dimensions <A,B,..>]
//!
//! Paste options:
//!   --at <X,Y,Z>         Reference point (e.g. the position of an armor stand)
//!   --facing <DIR>       north|south|east|west; offsets the structure so it
//!                        extends away from the reference point and rotates it
//!   --yaw <DEG>          Classify a continuous yaw into a facing instead
//!   --dimension <NAME>   Target dimension (default: overworld)
//!   --mode <MODE>        origin|center|bottom-center (default: origin)
//!
//! Split options:
//!   --threshold <N>      Max non-air blocks before splitting (default: 6000)
//!   --min-chunks <N>     Min chunk columns a structure must span (default: 4)
//!   --axis <x|y|z>       Split axis override (default: larger of X/Z)
//!
//! Count options:
//!   --min/--max <X,Y,Z>  Region corners; --max is exclusive on every axis,
//!                        so min 0,0,0 max 16,1,16 covers one chunk layer
//!
//! Every failure prints one message naming the stage that failed and exits
//! non-zero.

use std::path::PathBuf;

use voxstamp::analysis::{SplitOptions, SplitOutcome, count_non_air, split};
use voxstamp::core::error::Error;
use voxstamp::core::types::{IVec3, Result};
use voxstamp::math::{Aabb, Axis, CardinalDirection};
use voxstamp::placement::{PlacementMode, compute_facing_offset, compute_paste_anchor, paste_structure};
use voxstamp::storage;

fn main() {
    voxstamp::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let result = match command.as_str() {
        "paste" => cmd_paste(&args),
        "split" => cmd_split(&args),
        "bounds" => cmd_bounds(&args),
        "count" => cmd_count(&args),
        "init" => cmd_init(&args),
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            return;
        }
        other => {
            eprintln!("unknown command '{}'\n{}", other, USAGE);
            std::process::exit(2);
        }
    };

    if result.is_err() {
        std::process::exit(1);
    }
}

const USAGE: &str = "voxstamp <paste|split|bounds|count|init> [OPTIONS]\n\
Run with RUST_LOG=debug for per-voxel detail. See module docs for options.";

/// Log which stage failed and pass the error on
fn fail(stage: &str, err: Error) -> Error {
    log::error!("[{}] {}", stage, err);
    err
}

fn cmd_paste(args: &[String]) -> Result<()> {
    let world_dir = PathBuf::from(require_arg(args, "--world")?);
    let structure_file = PathBuf::from(require_arg(args, "--structure")?);
    let reference = parse_coord(&require_arg(args, "--at")?)?;
    let dimension = parse_str_arg(args, "--dimension").unwrap_or_else(|| "overworld".to_string());
    let mode_keyword = parse_str_arg(args, "--mode").unwrap_or_else(|| "origin".to_string());

    let mode = PlacementMode::parse(&mode_keyword)
        .map_err(|e| fail("placement calculation", e))?;
    let facing = resolve_facing(args).map_err(|e| fail("orientation classification", e))?;

    let structure = storage::load_structure(&structure_file)
        .map_err(|e| fail("bounds extraction", e))?;
    let bounds = structure
        .checked_bounds()
        .map_err(|e| fail("bounds extraction", e))?;

    let (target, rotation) = match facing {
        Some(facing) => (
            compute_facing_offset(reference, facing, structure.size()),
            facing.rotation_degrees(),
        ),
        None => (reference, 0.0),
    };
    let anchor = compute_paste_anchor(bounds, target.as_vec3(), mode);

    log::info!(
        "pasting {} into {} ({}): target {},{},{} anchor {},{},{} rotation {}° mode {}",
        structure_file.display(),
        world_dir.display(),
        dimension,
        target.x,
        target.y,
        target.z,
        anchor.x,
        anchor.y,
        anchor.z,
        rotation,
        mode.name()
    );

    let mut world = storage::load_world(&world_dir).map_err(|e| fail("world load", e))?;
    paste_structure(&mut world, &dimension, &structure, anchor, rotation)
        .map_err(|e| fail("paste", e))?;
    storage::save_world(&world_dir, &mut world).map_err(|e| fail("world save", e))?;

    log::info!("paste complete");
    Ok(())
}

fn cmd_split(args: &[String]) -> Result<()> {
    let structure_file = PathBuf::from(require_arg(args, "--structure")?);
    let out_dir = PathBuf::from(require_arg(args, "--out")?);
    let threshold = parse_u64_arg(args, "--threshold")?.unwrap_or(6000);
    let min_chunk_count = parse_u64_arg(args, "--min-chunks")?.unwrap_or(4);
    let axis = match parse_str_arg(args, "--axis") {
        Some(keyword) => Some(Axis::parse(&keyword).map_err(|e| fail("split", e))?),
        None => None,
    };

    let stem = structure_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("structure")
        .to_string();

    let structure =
        storage::load_structure(&structure_file).map_err(|e| fail("structure load", e))?;
    let options = SplitOptions {
        threshold,
        min_chunk_count,
        axis,
    };
    let outcome = split(structure, &options).map_err(|e| fail("split", e))?;

    match outcome {
        SplitOutcome::Kept(structure) => {
            let path = storage::structure_path(&out_dir, &format!("{}_part1", stem));
            storage::save_structure(&path, &structure)
                .map_err(|e| fail("split", Error::Split(format!("failed to write output: {}", e))))?;
            log::info!("no split needed; wrote {}", path.display());
        }
        SplitOutcome::Split {
            first,
            second,
            result,
        } => {
            let first_path = storage::structure_path(&out_dir, &format!("{}_part1", stem));
            let second_path = storage::structure_path(&out_dir, &format!("{}_part2", stem));
            storage::save_structure(&first_path, &first).map_err(|e| {
                fail("split", Error::Split(format!("failed to write part 1: {}", e)))
            })?;
            if let Err(e) = storage::save_structure(&second_path, &second) {
                // No partial outputs on failure
                let _ = std::fs::remove_file(&first_path);
                return Err(fail(
                    "split",
                    Error::Split(format!("failed to write part 2: {}", e)),
                ));
            }
            log::info!(
                "split along {}: {} ({} non-air), {} ({} non-air)",
                result.axis.name(),
                first_path.display(),
                result.first.1,
                second_path.display(),
                result.second.1
            );
        }
    }
    Ok(())
}

fn cmd_bounds(args: &[String]) -> Result<()> {
    let structure_file = PathBuf::from(require_arg(args, "--structure")?);
    let bounds = storage::extract_bounds(&structure_file)
        .map_err(|e| fail("bounds extraction", e))?;
    let size = bounds.size();
    println!(
        "min: {},{},{}  max: {},{},{}  size: {}x{}x{}",
        bounds.min.x, bounds.min.y, bounds.min.z,
        bounds.max.x, bounds.max.y, bounds.max.z,
        size.x, size.y, size.z
    );
    Ok(())
}

fn cmd_count(args: &[String]) -> Result<()> {
    let world_dir = PathBuf::from(require_arg(args, "--world")?);
    let dimension = require_arg(args, "--dimension")?;
    let min = parse_coord(&require_arg(args, "--min")?)?;
    let max = parse_coord(&require_arg(args, "--max")?)?;

    let world = storage::load_world(&world_dir).map_err(|e| fail("world load", e))?;
    let dim = world
        .dimension(&dimension)
        .map_err(|e| fail("density count", e))?;
    let region = Aabb::new(min, max);
    let count = count_non_air(dim, region);
    println!("{}", count);
    Ok(())
}

fn cmd_init(args: &[String]) -> Result<()> {
    let world_dir = PathBuf::from(require_arg(args, "--world")?);
    let name = parse_str_arg(args, "--name").unwrap_or_else(|| "world".to_string());
    let dimensions = parse_str_arg(args, "--dimensions")
        .unwrap_or_else(|| "overworld".to_string());
    let names: Vec<&str> = dimensions.split(',').map(str::trim).collect();

    let mut world = storage::create_world(&world_dir, &name, &names)
        .map_err(|e| fail("world init", e))?;
    storage::save_world(&world_dir, &mut world).map_err(|e| fail("world save", e))?;
    Ok(())
}

fn resolve_facing(args: &[String]) -> Result<Option<CardinalDirection>> {
    if let Some(keyword) = parse_str_arg(args, "--facing") {
        return Ok(Some(CardinalDirection::parse(&keyword)?));
    }
    if let Some(yaw) = parse_f32_arg(args, "--yaw")? {
        return CardinalDirection::classify_yaw(yaw)
            .map(Some)
            .ok_or_else(|| {
                Error::InvalidOrientation(format!(
                    "yaw {}° is not within 22.5° of a cardinal heading",
                    yaw
                ))
            });
    }
    Ok(None)
}

/// Parse "X,Y,Z" into a block coordinate
fn parse_coord(text: &str) -> Result<IVec3> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(fail(
            "argument parsing",
            Error::Format(format!("expected X,Y,Z coordinate, got '{}'", text)),
        ));
    }
    let mut values = [0i32; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| {
            fail(
                "argument parsing",
                Error::Format(format!("invalid coordinate component '{}'", part)),
            )
        })?;
    }
    Ok(IVec3::new(values[0], values[1], values[2]))
}

fn require_arg(args: &[String], flag: &str) -> Result<String> {
    parse_str_arg(args, flag).ok_or_else(|| {
        fail(
            "argument parsing",
            Error::Format(format!("missing required argument {}", flag)),
        )
    })
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// A present flag with an unparseable value is an error, never a silent
/// fallback to the default
fn parse_f32_arg(args: &[String], flag: &str) -> Result<Option<f32>> {
    match parse_str_arg(args, flag) {
        Some(value) => value.parse().map(Some).map_err(|_| {
            fail(
                "argument parsing",
                Error::Format(format!("invalid value '{}' for {}", value, flag)),
            )
        }),
        None => Ok(None),
    }
}

fn parse_u64_arg(args: &[String], flag: &str) -> Result<Option<u64>> {
    match parse_str_arg(args, flag) {
        Some(value) => value.parse().map(Some).map_err(|_| {
            fail(
                "argument parsing",
                Error::Format(format!("invalid value '{}' for {}", value, flag)),
            )
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_numeric_args_reject_garbage() {
        let args = args_of(&["voxstamp", "paste", "--yaw", "90x"]);
        assert!(matches!(
            parse_f32_arg(&args, "--yaw"),
            Err(Error::Format(_))
        ));

        let args = args_of(&["voxstamp", "split", "--threshold", "abc"]);
        assert!(matches!(
            parse_u64_arg(&args, "--threshold"),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_numeric_args_absent_is_none() {
        let args = args_of(&["voxstamp", "paste"]);
        assert_eq!(parse_f32_arg(&args, "--yaw").unwrap(), None);
        assert_eq!(parse_u64_arg(&args, "--threshold").unwrap(), None);
    }

    #[test]
    fn test_numeric_args_parse_values() {
        let args = args_of(&["voxstamp", "paste", "--yaw", "92.5", "--threshold", "6000"]);
        assert_eq!(parse_f32_arg(&args, "--yaw").unwrap(), Some(92.5));
        assert_eq!(parse_u64_arg(&args, "--threshold").unwrap(), Some(6000));
    }

    #[test]
    fn test_resolve_facing_bad_yaw_value_is_error() {
        // Malformed yaw must fail loudly, not fall back to a plain paste
        let args = args_of(&["voxstamp", "paste", "--yaw", "90x"]);
        assert!(matches!(resolve_facing(&args), Err(Error::Format(_))));

        let args = args_of(&["voxstamp", "paste", "--yaw", "45"]);
        assert!(matches!(
            resolve_facing(&args),
            Err(Error::InvalidOrientation(_))
        ));

        let args = args_of(&["voxstamp", "paste", "--yaw", "180"]);
        assert_eq!(
            resolve_facing(&args).unwrap(),
            Some(CardinalDirection::North)
        );
    }

    #[test]
    fn test_parse_coord() {
        assert_eq!(parse_coord("3, -5,64").unwrap(), IVec3::new(3, -5, 64));
        assert!(matches!(parse_coord("1,2"), Err(Error::Format(_))));
        assert!(matches!(parse_coord("a,b,c"), Err(Error::Format(_))));
    }
}
