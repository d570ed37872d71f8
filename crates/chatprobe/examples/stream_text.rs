use chatprobe::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StreamError> {
    let config = ClientConfig::from_env()?;
    let client = Client::new(&config)?;
    let message = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Introduce yourself in one sentence.".to_string());

    let mut stream = client
        .start(config.request("deepseek-reasoner", message))
        .await?;

    // Snapshots are cumulative; print only what is new.
    let mut thinking_seen = 0;
    let mut content_seen = 0;
    while let Some(state) = stream.next_state().await {
        if state.thinking.len() > thinking_seen {
            eprint!("{}", &state.thinking[thinking_seen..]);
            thinking_seen = state.thinking.len();
        }
        if state.content.len() > content_seen {
            print!("{}", &state.content[content_seen..]);
            content_seen = state.content.len();
        }
        if state.is_terminal() {
            break;
        }
    }

    let _ = stream.finish().await?;
    println!();
    Ok(())
}
