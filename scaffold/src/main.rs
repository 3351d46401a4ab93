//! `scaffold` command-line entry point.
//!
//! Loads the settings file, asks for project details and provisions the
//! project at the given path.

use anyhow::Result;
use clap::Parser;

use scaffold::core::stage::StageOutcome;
use scaffold::error::exit_code_for;
use scaffold::exit_codes;
use scaffold::io::git::GitCli;
use scaffold::io::github::GithubClient;
use scaffold::io::packages::CommandInstaller;
use scaffold::io::questionnaire::InquireQuestionnaire;
use scaffold::io::settings::{ConfigStore, InstallPaths};
use scaffold::io::template::FsTemplates;
use scaffold::logging;
use scaffold::provision::{ProvisionOutcome, Provisioner};

#[derive(Parser)]
#[command(
    name = "scaffold",
    version,
    about = "Create a new project from a template"
)]
struct Cli {
    /// Directory to create. Must not exist yet.
    path: Option<String>,

    /// Install lint and test packages (npm or yarn) after provisioning.
    #[arg(long)]
    install: bool,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(exit_code_for(&err));
    }
    std::process::exit(exit_codes::OK);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut store = ConfigStore::new(InstallPaths::discover()?);
    store.load(None, false)?;

    let questionnaire = InquireQuestionnaire::new(store.locale());
    let vcs = GitCli::new();
    let remote = GithubClient::new();
    let mut provisioner = Provisioner::new(&mut store, &questionnaire, &vcs, &remote, &FsTemplates);

    let outcome = provisioner.run(cli.path.as_deref())?;
    print_summary(&outcome);
    if cli.install {
        provisioner.install_dependencies(&outcome.plan, &CommandInstaller::default())?;
    }
    Ok(())
}

fn print_summary(outcome: &ProvisionOutcome) {
    let plan = &outcome.plan;
    println!("Created {} at {}", plan.name, plan.dest_path.display());
    for (stage, result) in outcome.report.entries() {
        match result {
            StageOutcome::Completed => println!("  ok       {stage}"),
            StageOutcome::Skipped => println!("  skipped  {stage}"),
            StageOutcome::Degraded(reason) => println!("  degraded {stage}: {reason}"),
        }
    }
    if plan.has_remote {
        println!("Remote: {}", plan.vcs.ssh_url);
    }
}
