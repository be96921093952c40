//! Subcommand implementations

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use showcase_core::{
    JobConfig, Pipeline, PlanFormat, SceneDescription, SceneSession, StagePlan, plan_lineup,
    plan_turntable_batch,
};
use tracing::info;

use crate::{InitConfigArgs, PlanArgs};

/// Plan every clip of the job and write one plan file per clip
pub fn run_plan(args: &PlanArgs) -> anyhow::Result<Vec<PathBuf>> {
    let description = SceneDescription::load(&args.scene)
        .with_context(|| format!("load scene description '{}'", args.scene.display()))?;

    let mut config = match &args.config {
        Some(path) => JobConfig::load(path)
            .with_context(|| format!("load job config '{}'", path.display()))?,
        None => JobConfig::default(),
    };
    if let Some(pipeline) = args.pipeline {
        config.pipeline = Some(pipeline.into());
    }
    let pipeline = config.require_pipeline()?;
    config.validate().context("invalid job config")?;

    info!(
        pipeline = pipeline.name(),
        assets = description.assets.len(),
        "Planning job"
    );
    let plans = match pipeline {
        Pipeline::Turntable => {
            let mut session = SceneSession::new();
            plan_turntable_batch(&mut session, &description.assets, &config)
                .context("plan turntables")?
        }
        Pipeline::Lineup => {
            let (mut session, ids) = description.build_session().context("build scene")?;
            vec![plan_lineup(&mut session, &ids, &config).context("plan lineup")?]
        }
    };

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    write_plans(&plans, &args.out, args.format.into())
}

fn write_plans(plans: &[StagePlan], dir: &Path, format: PlanFormat) -> anyhow::Result<Vec<PathBuf>> {
    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(plans.len());
    for plan in plans {
        let stem = unique_stem(&sanitize_file_stem(&plan.name), &mut used);
        let path = dir.join(format!("{stem}.plan.{}", format.extension()));
        plan.save(&path, format)
            .with_context(|| format!("write plan '{}'", path.display()))?;
        info!(path = %path.display(), "Wrote plan");
        written.push(path);
    }
    Ok(written)
}

/// Keep file-name-safe characters of an asset name
fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "asset".to_string()
    } else {
        stem.to_string()
    }
}

fn unique_stem(stem: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = stem.to_string();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{stem}_{n}");
        n += 1;
    }
    candidate
}

/// Write a default job file
pub fn run_init_config(args: &InitConfigArgs) -> anyhow::Result<()> {
    if args.out.exists() && !args.force {
        bail!(
            "'{}' already exists (pass --force to overwrite)",
            args.out.display()
        );
    }
    let config = match args.pipeline {
        Some(pipeline) => JobConfig::for_pipeline(pipeline.into()),
        None => JobConfig::default(),
    };
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    config
        .save(&args.out)
        .with_context(|| format!("write job config '{}'", args.out.display()))?;
    info!(path = %args.out.display(), "Wrote job config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FormatArg, PipelineArg};
    use tempfile::TempDir;

    const SCENE: &str = r#"(
        assets: [
            (
                name: "Red Chair",
                nodes: [(name: "seat", translation: (1.0, 0.0, 0.5), bounds: Some((min: (-0.5, -0.5, -0.5), max: (0.5, 0.5, 0.5))))],
            ),
            (
                name: "lamp",
                nodes: [(
                    name: "base",
                    children: [(name: "shade", translation: (0.0, 0.0, 1.5), bounds: Some((min: (-0.3, -0.3, -0.2), max: (0.3, 0.3, 0.2))))],
                )],
            ),
        ],
    )"#;

    fn write_scene(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("scene.ron");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn plan_args(dir: &TempDir, scene: PathBuf) -> PlanArgs {
        PlanArgs {
            scene,
            config: None,
            pipeline: None,
            out: dir.path().join("plans"),
            format: FormatArg::Ron,
        }
    }

    #[test]
    fn test_turntable_writes_plan_per_asset() {
        let dir = TempDir::new().unwrap();
        let mut args = plan_args(&dir, write_scene(&dir, SCENE));
        args.pipeline = Some(PipelineArg::Turntable);

        let written = run_plan(&args).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Red_Chair.plan.ron", "lamp.plan.ron"]);

        let content = std::fs::read_to_string(&written[0]).unwrap();
        let plan = StagePlan::from_ron_str(&content).unwrap();
        assert_eq!(plan.name, "Red Chair");
        assert_eq!(plan.pipeline, Pipeline::Turntable);
    }

    #[test]
    fn test_lineup_from_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("job.ron");
        std::fs::write(&config_path, "(pipeline: Some(lineup), loop_pad: 1)").unwrap();
        let mut args = plan_args(&dir, write_scene(&dir, SCENE));
        args.config = Some(config_path);
        args.format = FormatArg::Json;

        let written = run_plan(&args).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("lineup.plan.json"));
        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert!(content.contains("LineupMaster"));
    }

    #[test]
    fn test_missing_pipeline_fails() {
        let dir = TempDir::new().unwrap();
        let args = plan_args(&dir, write_scene(&dir, SCENE));
        let err = run_plan(&args).unwrap_err();
        assert!(err.to_string().contains("pipeline"), "{err:#}");
    }

    #[test]
    fn test_empty_scene_fails() {
        let dir = TempDir::new().unwrap();
        let mut args = plan_args(&dir, write_scene(&dir, "(assets: [])"));
        args.pipeline = Some(PipelineArg::Lineup);
        assert!(run_plan(&args).is_err());
        args.pipeline = Some(PipelineArg::Turntable);
        assert!(run_plan(&args).is_err());
    }

    #[test]
    fn test_missing_scene_fails_with_context() {
        let dir = TempDir::new().unwrap();
        let mut args = plan_args(&dir, dir.path().join("absent.ron"));
        args.pipeline = Some(PipelineArg::Lineup);
        let err = run_plan(&args).unwrap_err();
        assert!(format!("{err:#}").contains("load scene description"));
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Red Chair"), "Red_Chair");
        assert_eq!(sanitize_file_stem("../evil"), "_evil");
        assert_eq!(sanitize_file_stem("  "), "asset");
        assert_eq!(sanitize_file_stem("vase-02.final"), "vase-02.final");
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let mut used = HashSet::new();
        assert_eq!(unique_stem("lamp", &mut used), "lamp");
        assert_eq!(unique_stem("lamp", &mut used), "lamp_2");
        assert_eq!(unique_stem("lamp", &mut used), "lamp_3");
    }

    #[test]
    fn test_init_config() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("jobs").join("turntable.ron");
        let args = InitConfigArgs {
            out: out.clone(),
            pipeline: Some(PipelineArg::Turntable),
            force: false,
        };
        run_init_config(&args).unwrap();
        let config = JobConfig::load(&out).unwrap();
        assert_eq!(config.pipeline, Some(Pipeline::Turntable));
        assert_eq!(config.size, Some(1024));

        assert!(run_init_config(&args).is_err());
        run_init_config(&InitConfigArgs { force: true, ..args }).unwrap();
    }
}
