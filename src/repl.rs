use log::{ info, warn };
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };

use crate::llm::chat::DoctorClient;
use crate::models::chat::{ create_conversation, ChatTurn, Conversation };
use crate::models::stream::{ AggregatedResult, StreamChunk };

#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput {
    Quit,
    NewConversation,
    Empty,
    Query(String),
}

pub fn parse_input(line: &str) -> ReplInput {
    match line.trim() {
        "" => ReplInput::Empty,
        "/quit" | "/exit" => ReplInput::Quit,
        "/new" => ReplInput::NewConversation,
        query => ReplInput::Query(query.to_string()),
    }
}

/// Folds a finished send into the conversation.
///
/// When the service returned its own history that replaces the local turns;
/// otherwise the query and the answer are appended. Failed sends leave the
/// conversation untouched.
pub fn apply_result(conversation: &mut Conversation, query: &str, result: AggregatedResult) {
    if result.is_error() {
        return;
    }
    if result.messages.as_slice() != conversation.history() {
        conversation.replace_history(result.messages);
    } else {
        conversation.push_turn(ChatTurn::user(query.trim()).stamped());
        conversation.push_turn(ChatTurn::assistant(result.content).stamped());
    }
}

fn print_chunk(chunk: &StreamChunk) {
    print!("{}", chunk.content);
    let _ = std::io::stdout().flush();
}

/// Asks one question and prints the answer as it streams in.
pub async fn ask(
    client: &dyn DoctorClient,
    query: &str,
    history: &[ChatTurn]
) -> AggregatedResult {
    let mut on_chunk = print_chunk;
    let result = client.send_message(query, history, Some(&mut on_chunk)).await;

    if let Some(err) = &result.error {
        println!("{}", result.content);
        warn!("AssistDoctor request failed: {}", err);
    } else {
        println!();
    }
    result
}

pub async fn run_repl(client: Arc<dyn DoctorClient>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut index = 1;
    let mut conversation = create_conversation(index);
    info!("Started conversation {} ({})", conversation.title, conversation.id);
    println!("{}", conversation.messages[0].content);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            ReplInput::Quit => break,
            ReplInput::Empty => continue,
            ReplInput::NewConversation => {
                index += 1;
                conversation = create_conversation(index);
                info!("Started conversation {} ({})", conversation.title, conversation.id);
                println!("{}", conversation.messages[0].content);
            }
            ReplInput::Query(query) => {
                let result = ask(client.as_ref(), &query, conversation.history()).await;
                apply_result(&mut conversation, &query, result);
            }
        }
    }

    Ok(())
}
