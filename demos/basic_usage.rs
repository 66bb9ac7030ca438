//! Walk through the client against a local Ollama server.
//!
//! Run with: cargo run --example basic_usage
//! Set `OLLAMA_HOST` to point at another server, `RUST_LOG=ollama_lib_rust=debug`
//! together with `OLLAMA_DEBUG=1` to see the dispatcher lines.

use futures::StreamExt;
use ollama_lib_rust::types::{
    ChatMessage, ChatRequest, CopyModelRequest, EmbeddingRequest, GenerateRequest, KeepAlive,
    PullModelRequest,
};
use ollama_lib_rust::{logging, CallContext, OllamaClient};
use std::io::Write;
use std::time::Duration;

const MODEL: &str = "llama3.2:1b";

#[tokio::main]
async fn main() -> ollama_lib_rust::Result<()> {
    logging::init_tracing("ollama_lib_rust=info");

    let client = OllamaClient::from_env()?;

    for model in client.list_models().await? {
        println!("Model: {}, Size: {}", model.name, model.size);
    }

    let mut pull = client.pull_model(PullModelRequest::new(MODEL)).await?;
    while let Some(status) = pull.next().await {
        println!("Pull status: {}", status?.status);
    }

    let embedding = client
        .embeddings(&EmbeddingRequest::new(MODEL, "Hello world"))
        .await?;
    let head: Vec<f32> = embedding.embedding.iter().take(5).copied().collect();
    println!("Embeddings ({} dims): {head:?}", embedding.dimensions());

    let copy = format!("{MODEL}-copy");
    client
        .copy_model(&CopyModelRequest::new(MODEL, copy.as_str()))
        .await?;

    let info = client.show_model(MODEL, None).await?;
    println!("Model details: {:?}", info.details);

    for model in client.list_running_models().await? {
        println!("Running model: {}", model.name);
    }

    let chat = ChatRequest::new(MODEL, vec![ChatMessage::user("why is the sky blue?")])
        .with_keep_alive(KeepAlive::from_mins(5));
    let resp = client.chat(chat).await?;
    println!("Chat response: {}", resp.message.content);

    let generated = client
        .generate(GenerateRequest::new(MODEL, "Hello world").with_keep_alive(Duration::from_secs(300)))
        .await?;
    println!("Generate response: {}", generated.response);

    client.delete_model(&copy).await?;
    if client.show_model(&copy, None).await.is_ok() {
        eprintln!("model still exists after deletion");
    }

    // streamed chat with an overall deadline
    let bounded = client.with_context(CallContext::new().with_timeout(Duration::from_secs(60)));
    let mut stream = bounded
        .chat_stream(ChatRequest::new(
            MODEL,
            vec![ChatMessage::user("Tell me a short story.")],
        ))
        .await?;
    while let Some(chunk) = stream.next().await {
        print!("{}", chunk?.message.content);
        let _ = std::io::stdout().flush();
    }
    println!();

    Ok(())
}
