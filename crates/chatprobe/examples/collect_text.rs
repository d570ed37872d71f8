use chatprobe::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StreamError> {
    let config = ClientConfig::from_env()?;
    let client = Client::new(&config)?;

    let stream = client
        .start(config.request("deepseek-chat", "Say hello in five words."))
        .await?;
    let state = stream.finish().await?;

    if !state.thinking.is_empty() {
        eprintln!("thinking:\n{}", state.thinking);
    }
    println!("{}", state.content);
    Ok(())
}
