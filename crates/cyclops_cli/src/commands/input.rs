//! Input-file generation commands.

use crate::RunContext;
use anyhow::{Context, Result};
use clap::Args;
use cyclops_core::input::{
    load_template, read_fleet_csv, read_reactor_list, read_recipe_csv, recipe_dict,
    write_main_input, write_reactor, write_reactors, write_recipes, write_region,
    DecayMode, SimulationParams,
};
use std::path::PathBuf;

/// `write-reactors [csv] [reactor_template] [region_template]
/// [reactor_output] [region_output]`
#[derive(Debug, Args)]
pub struct WriteReactorsCommand {
    /// Headerless `country,reactor_name,capacity,n_assem_core,n_assem_batch`
    pub csv: PathBuf,
    pub reactor_template: PathBuf,
    pub region_template: PathBuf,
    pub reactor_output: PathBuf,
    pub region_output: PathBuf,
}

impl WriteReactorsCommand {
    pub fn run(&self, _ctx: &RunContext) -> Result<()> {
        let list = read_reactor_list(&self.csv)?;
        let reactor_tpl = load_template(&self.reactor_template)?;
        let region_tpl = load_template(&self.region_template)?;
        write_reactors(
            &list,
            &reactor_tpl,
            &region_tpl,
            &self.reactor_output,
            &self.region_output,
        )
        .context("failed to render reactor list")?;
        println!(
            "wrote {} reactors to {} and {}",
            list.len(),
            self.reactor_output.display(),
            self.region_output.display()
        );
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct RenderInputCommand {
    /// Fleet table: Country, Reactor Name, Type, Net Electric Capacity, Operator
    #[arg(long)]
    pub fleet: PathBuf,
    #[arg(long)]
    pub reactor_template: PathBuf,
    #[arg(long)]
    pub region_template: PathBuf,
    #[arg(long)]
    pub recipe_template: PathBuf,
    #[arg(long)]
    pub main_template: PathBuf,
    /// Headerless `nuclide,mass_frac` rows of the fresh fuel
    #[arg(long)]
    pub fresh_recipe: PathBuf,
    /// Headerless `nuclide,mass_frac` rows of the spent fuel
    #[arg(long)]
    pub spent_recipe: PathBuf,
    /// Simulation length in months
    #[arg(long)]
    pub duration: u32,
    #[arg(long, default_value_t = 1)]
    pub start_month: u32,
    #[arg(long)]
    pub start_year: i32,
    /// Decay mode of the simulation: never, manual or lazy
    #[arg(long, default_value_t = DecayMode::Never)]
    pub decay: DecayMode,
}

impl RenderInputCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let fleet = read_fleet_csv(&self.fleet)?;
        let reactor_out = ctx.out_dir.join("rendered-reactor.xml");
        let region_out = ctx.out_dir.join("rendered-region.xml");
        let recipe_out = ctx.out_dir.join("rendered-recipe.xml");
        let main_out = ctx.out_dir.join("rendered-main-input.xml");

        write_reactor(
            &fleet,
            &load_template(&self.reactor_template)?,
            &reactor_out,
            &ctx.config.reactor_specs,
        )
        .context("failed to render reactors")?;
        write_region(
            &fleet,
            &ctx.config.deployment,
            &load_template(&self.region_template)?,
            &region_out,
        )
        .context("failed to render region")?;

        let (fresh_ids, fresh_comps) = read_recipe_csv(&self.fresh_recipe)?;
        let (spent_ids, spent_comps) = read_recipe_csv(&self.spent_recipe)?;
        let (fresh, spent) = recipe_dict(&fresh_ids, &fresh_comps, &spent_ids, &spent_comps)?;
        write_recipes(
            &fresh,
            &spent,
            &load_template(&self.recipe_template)?,
            &recipe_out,
        )
        .context("failed to render recipes")?;

        let params = SimulationParams {
            duration: self.duration,
            start_month: self.start_month,
            start_year: self.start_year,
            decay: self.decay,
        };
        write_main_input(
            &params,
            &reactor_out,
            &region_out,
            &recipe_out,
            &load_template(&self.main_template)?,
            &main_out,
        )
        .context("failed to render main input")?;
        println!("wrote {}", main_out.display());
        Ok(())
    }
}
