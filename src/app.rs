use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::config::{Command, Config, IfsArgs, LSystemArgs, OutputArgs, OutputFormat};
use crate::definition::Definition;
use crate::export;
use crate::ifs::{Ifs, IfsParams};
use crate::limits::Limits;
use crate::lsystem::{LSystem, LSystemParams, Variant};
use crate::presets::{self, ifs_presets, lsystem_presets};
use crate::rng;
use crate::turtle::DistanceScope;

pub fn run(cfg: Config) -> Result<()> {
    let limits = cfg.limits();
    match &cfg.command {
        Command::Presets => list_presets(&mut io::stdout().lock()),
        Command::Ifs(args) => run_ifs(args, &limits),
        Command::Lsystem(args) => run_lsystem(args, &limits),
    }
}

pub fn list_presets<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "ifs:")?;
    for (idx, p) in ifs_presets().iter().enumerate() {
        writeln!(out, "  {idx}: {} ({} maps)", p.name, p.params.rules.len())?;
    }
    writeln!(out, "lsystem:")?;
    for (idx, p) in lsystem_presets().iter().enumerate() {
        writeln!(
            out,
            "  {idx}: {} (axiom {}, {} passes)",
            p.name, p.params.axiom, p.params.iterations
        )?;
    }
    Ok(())
}

pub fn resolve_ifs(args: &IfsArgs) -> Result<IfsParams> {
    let mut params = match &args.def {
        Some(path) => match load_definition(path)? {
            Definition::Ifs(params) => params,
            Definition::LSystem(_) => bail!("{} defines an l-system, not an ifs", path.display()),
        },
        None => {
            let mut all = ifs_presets();
            let names = all.iter().map(|p| p.name).collect::<Vec<_>>();
            let idx = presets::resolve(args.preset.as_deref(), &names)?;
            all.swap_remove(idx).params
        }
    };
    if let Some(iterations) = args.iterations {
        params.iterations = iterations;
    }
    if let Some(density) = args.density {
        params.density = density;
    }
    Ok(params)
}

pub fn resolve_lsystem(args: &LSystemArgs) -> Result<LSystemParams> {
    let mut params = match &args.def {
        Some(path) => match load_definition(path)? {
            Definition::LSystem(params) => params,
            Definition::Ifs(_) => bail!("{} defines an ifs, not an l-system", path.display()),
        },
        None => {
            let mut all = lsystem_presets();
            let names = all.iter().map(|p| p.name).collect::<Vec<_>>();
            let idx = presets::resolve(args.preset.as_deref(), &names)?;
            all.swap_remove(idx).params
        }
    };
    if let Some(iterations) = args.iterations {
        params.iterations = iterations;
    }
    if args.scoped_distance {
        params.distance_scope = DistanceScope::Scoped;
    }
    Ok(params)
}

fn load_definition(path: &Path) -> Result<Definition> {
    Definition::load(path).with_context(|| format!("load definition {}", path.display()))
}

fn run_ifs(args: &IfsArgs, limits: &Limits) -> Result<()> {
    let params = resolve_ifs(args)?;
    let rng = match args.seed {
        Some(seed) => rng::seeded(seed),
        None => fastrand::Rng::new(),
    };
    let mut ifs = Ifs::with_limits(params, rng, *limits).context("configure ifs")?;
    ifs.run();

    let mut out = open_output(&args.output)?;
    match args.output.format {
        OutputFormat::Csv => export::write_ifs_csv(&mut out, ifs.points())?,
        OutputFormat::Summary => {
            export::write_ifs_summary(&mut out, ifs.points(), ifs.bounds(), ifs.rules().len())?
        }
    }
    out.flush().context("flush output")
}

fn run_lsystem(args: &LSystemArgs, limits: &Limits) -> Result<()> {
    let params = resolve_lsystem(args)?;
    let variant = if args.time { Variant::Time } else { Variant::Position };
    let mut system = LSystem::with_limits(variant, &params, limits).context("configure l-system")?;
    system.run().context("run l-system")?;

    let mut out = open_output(&args.output)?;
    match args.output.format {
        OutputFormat::Csv => export::write_geometry_csv(&mut out, system.points())?,
        OutputFormat::Summary => export::write_geometry_summary(
            &mut out,
            system.turtle().program_len(),
            system.points(),
            system.bounds(),
        )?,
    }
    out.flush().context("flush output")
}

fn open_output(args: &OutputArgs) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match &args.out {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    Ok(writer)
}
