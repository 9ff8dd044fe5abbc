use anyhow::Result;

use crate::{
    cli::{Cli, Command},
    domain::{self, identity::Identity, message::OutboundMessage},
    infra, prattle,
    ui::{self, ConsoleSink},
    usecases::{
        self, bootstrap,
        context::AppContext,
        contracts::DirectoryClient,
        dispatch::DispatchRequest,
        session::ChatSession,
    },
};

const SEND_COMPLETED: &str = "SEND_COMPLETED";

pub fn run(cli: Cli) -> Result<()> {
    let (context, _logging) = bootstrap::bootstrap(cli.config.as_deref())?;
    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        prattle = prattle::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(execute(&context, cli.command));
    // stdin reads run on a blocking thread that never finishes on its own
    runtime.shutdown_background();

    result
}

async fn execute(context: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Chat { username } => {
            let mut session = context.session();
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let sink = ConsoleSink::new(std::io::stdout());
            ui::shell::start(&mut session, &username, input, std::io::stdout(), sink).await?;
        }
        Command::Send {
            from,
            content,
            target,
        } => {
            let request = DispatchRequest::new(from, content, target.to_target());
            let message = send_once(context.session(), request).await?;
            tracing::info!(
                code = SEND_COMPLETED,
                to_user_id = message.to_user_id,
                "single message sent"
            );
            println!("Message sent.");
        }
        Command::Users => {
            let users = context.directory.list_users().await?;
            for line in user_lines(&users) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// Connects as the sender, dispatches one message and disconnects again.
///
/// The server greets every new connection, so the inbound stream is held until
/// disconnect even though nothing reads it.
async fn send_once(mut session: ChatSession, request: DispatchRequest) -> Result<OutboundMessage> {
    let _frames = session.connect(&request.sender).await?;
    let sent = session.dispatch(request).await;
    session.disconnect().await;

    Ok(sent?)
}

fn user_lines(users: &[Identity]) -> Vec<String> {
    if users.is_empty() {
        return vec!["No users registered.".to_owned()];
    }

    users
        .iter()
        .map(|user| format!("{:>6}  {}", user.id, user.display_name))
        .collect()
}
