use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vsa_deployer::backend::{ExternalInstaller, ScriptHostProbe, VirshControlPlane};
use vsa_deployer::cli::commands::{Cli, Cmd, GlobalOpts};
use vsa_deployer::cli::completions::{generate_man_page, print_completions};
use vsa_deployer::{Deployer, InstallOptions, InstallOutcome};

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Wire the real collaborators together and run one workflow command
fn run(cmd: Cmd, global: &GlobalOpts) -> Result<()> {
    init_logging(&global.log_level);
    let settings = global.settings();

    let control = VirshControlPlane::new(
        settings.virsh.clone(),
        settings.connect_uri.clone(),
        settings.virsh_timeout,
    );
    let installer = ExternalInstaller::new(
        settings.installer.clone(),
        settings.work_dir.clone(),
        settings.installer_timeout,
    );
    let probe = ScriptHostProbe::new(settings.device_probe(), settings.virsh_timeout);
    let deployer = Deployer::new(&settings, &control, &installer, &probe);

    match cmd {
        Cmd::Install { ao, disk_file } => match deployer.install(&InstallOptions { ao, disk_file })? {
            InstallOutcome::AlreadyPresent(state) => {
                println!("The VSA VM is present on the host ({state}), exit from installation");
            }
            InstallOutcome::Installed { output } => {
                print!("{output}");
                println!("VSA installation complete");
            }
        },
        Cmd::Destroy => {
            deployer.destroy()?;
            println!("VSA destroy success");
        }
        Cmd::Status => println!("{}", deployer.status()?),
        Cmd::Completions { .. } | Cmd::ManPage => {}
    }
    Ok(())
}

/// ---- main ----
fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Completions { shell } => print_completions(shell),
        Cmd::ManPage => generate_man_page()?,
        cmd => run(cmd, &cli.global)?,
    }
    Ok(())
}
