use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::target::DispatchTarget;

#[derive(Debug, Parser)]
#[command(name = "prattle", about = "Prattle chat client (console)")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Connect and chat interactively
    Chat {
        #[arg(short, long)]
        username: String,
    },
    /// Send a single message and disconnect
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        content: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List users known to the directory
    Users,
}

/// Target flags; more than one is resolved by the configured target policy.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TargetArgs {
    /// Recipient username
    #[arg(long)]
    pub user: Option<String>,
    /// Recipient group name
    #[arg(long)]
    pub group: Option<String>,
    /// Send to everyone
    #[arg(long)]
    pub broadcast: bool,
}

impl TargetArgs {
    pub fn to_target(&self) -> DispatchTarget {
        let mut target = DispatchTarget::default();
        if let Some(user) = &self.user {
            target.user = user.clone();
        }
        if let Some(group) = &self.group {
            target.group = group.clone();
        }
        if self.broadcast {
            target.broadcast = DispatchTarget::broadcast().broadcast;
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};
    use crate::domain::target::DispatchTarget;

    #[test]
    fn parses_chat_with_global_config() {
        let cli = Cli::parse_from([
            "prattle",
            "chat",
            "--username",
            "alice",
            "--config",
            "custom.toml",
        ]);

        assert!(matches!(cli.command, Command::Chat { ref username } if username == "alice"));
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }

    #[test]
    fn send_maps_flags_to_target() {
        let cli = Cli::parse_from([
            "prattle", "send", "--from", "alice", "--content", "hi", "--group", "team",
        ]);

        let Command::Send {
            from,
            content,
            target,
        } = cli.command
        else {
            panic!("expected send command");
        };
        assert_eq!(from, "alice");
        assert_eq!(content, "hi");
        assert_eq!(target.to_target(), DispatchTarget::group("team"));
    }

    #[test]
    fn send_keeps_every_target_flag_given() {
        let cli = Cli::parse_from([
            "prattle",
            "send",
            "--from",
            "alice",
            "--content",
            "hi",
            "--user",
            "bob",
            "--broadcast",
        ]);

        let Command::Send { target, .. } = cli.command else {
            panic!("expected send command");
        };
        assert_eq!(target.to_target().provided(), 2);
    }

    #[test]
    fn send_without_target_flags_yields_empty_target() {
        let cli = Cli::parse_from(["prattle", "send", "--from", "alice", "--content", "hi"]);

        let Command::Send { target, .. } = cli.command else {
            panic!("expected send command");
        };
        assert_eq!(target.to_target().provided(), 0);
    }

    #[test]
    fn command_is_required() {
        assert!(Cli::try_parse_from(["prattle"]).is_err());
    }
}
