use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;
use uuid::Uuid;

use fretpad::api::FretpadApi;
use fretpad::backend::fs::FileBackend;
use fretpad::backend::StorageBackend;
use fretpad::error::{FretpadError, Result};
use fretpad::profiles::ProfileUpdate;

mod cli;
use cli::args::{Cli, Commands, UsersCommands};
use cli::print;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = resolve_data_dir(&cli)?;
    let mut api = FretpadApi::open(FileBackend::new(data_dir))?;

    match cli.command {
        Some(Commands::Users { command }) => handle_users(&mut api, command),
        Some(Commands::Export { user, all, out }) => handle_export(&mut api, user, all, out),
        Some(Commands::Import {
            file,
            all,
            overwrite,
        }) => handle_import(&mut api, &file, all, overwrite),
        Some(Commands::Backup) => {
            let at = api.create_backup();
            print::print_success(&format!("Backup written ({})", at.format("%Y-%m-%d %H:%M")));
            Ok(())
        }
        Some(Commands::Restore) => {
            let at = api.restore_from_backup()?;
            print::print_success(&format!(
                "Restored backup from {}",
                at.format("%Y-%m-%d %H:%M")
            ));
            Ok(())
        }
        None => handle_users(&mut api, None),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "fretpad=debug" } else { "fretpad=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    if let Ok(home) = std::env::var("FRETPAD_HOME") {
        return Ok(PathBuf::from(home));
    }
    let dirs = ProjectDirs::from("com", "fretpad", "fretpad")
        .ok_or_else(|| FretpadError::Store("could not determine data directory".to_string()))?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Accepts a full id, a unique id prefix, or an exact profile name.
fn resolve_user<B: StorageBackend>(api: &FretpadApi<B>, input: &str) -> Result<Uuid> {
    if let Ok(id) = input.parse::<Uuid>() {
        if api.users().iter().any(|u| u.id == id) {
            return Ok(id);
        }
        return Err(FretpadError::UserNotFound(id));
    }
    if let Some(user) = api.users().iter().find(|u| u.name == input) {
        return Ok(user.id);
    }
    let prefix_matches: Vec<Uuid> = api
        .users()
        .iter()
        .filter(|u| u.id.to_string().starts_with(input))
        .map(|u| u.id)
        .collect();
    match prefix_matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(FretpadError::Store(format!("no profile matches '{}'", input))),
        _ => Err(FretpadError::Store(format!(
            "'{}' is ambiguous, use more characters",
            input
        ))),
    }
}

fn handle_users<B: StorageBackend>(
    api: &mut FretpadApi<B>,
    command: Option<UsersCommands>,
) -> Result<()> {
    match command {
        None | Some(UsersCommands::List) => {
            let current = api.current_user().map(|u| u.id);
            print::print_users(api.users(), current);
            Ok(())
        }
        Some(UsersCommands::Create {
            name,
            email,
            avatar,
        }) => {
            let id = api.create_user(&name, email, avatar)?;
            print::print_success(&format!("Created profile '{}' ({})", name, short(id)));
            Ok(())
        }
        Some(UsersCommands::Delete { user }) => {
            let id = resolve_user(api, &user)?;
            api.delete_user(id)?;
            print::print_success(&format!("Deleted profile '{}'", user));
            Ok(())
        }
        Some(UsersCommands::Switch { user }) => {
            let id = resolve_user(api, &user)?;
            api.switch_user(id)?;
            print::print_success(&format!("Switched to '{}'", user));
            Ok(())
        }
        Some(UsersCommands::Show { user }) => {
            let id = resolve_user(api, &user)?;
            let profile = api
                .users()
                .iter()
                .find(|u| u.id == id)
                .ok_or(FretpadError::UserNotFound(id))?;
            print::print_user_details(profile);
            Ok(())
        }
        Some(UsersCommands::Rename { user, new_name }) => {
            let id = resolve_user(api, &user)?;
            api.update_user_profile(
                id,
                ProfileUpdate {
                    name: Some(new_name.clone()),
                    ..ProfileUpdate::default()
                },
            )?;
            print::print_success(&format!("Renamed '{}' to '{}'", user, new_name));
            Ok(())
        }
    }
}

fn handle_export<B: StorageBackend>(
    api: &mut FretpadApi<B>,
    user: Option<String>,
    all: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let dir = out.unwrap_or_else(|| PathBuf::from("."));
    let path = if all {
        api.export_all_users_to_file(&dir)?
    } else {
        let input = user.ok_or_else(|| {
            FretpadError::Store("pass a profile name/id, or --all".to_string())
        })?;
        let id = resolve_user(api, &input)?;
        api.export_user_to_file(id, &dir)?
    };
    print::print_success(&format!("Exported to {}", path.display()));
    Ok(())
}

fn handle_import<B: StorageBackend>(
    api: &mut FretpadApi<B>,
    file: &std::path::Path,
    all: bool,
    overwrite: bool,
) -> Result<()> {
    if all {
        let report = api.import_all_users_from_file(file, overwrite)?;
        for (name, error) in &report.failed {
            print::print_warning(&format!("Skipped '{}': {}", name, error));
        }
        print::print_success(&format!("Imported {} profile(s)", report.imported.len()));
    } else {
        let id = api.import_user_from_file(file, overwrite)?;
        let name = api
            .users()
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.clone())
            .unwrap_or_default();
        print::print_success(&format!("Imported profile '{}'", name));
    }
    Ok(())
}

fn short(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}
