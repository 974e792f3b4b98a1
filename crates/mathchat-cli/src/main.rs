use anyhow::Result;
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;

use mathchat::models::message::Message;
use mathchat::normalize::normalize;
use mathchat::prompt_template::render_system_prompt;
use mathchat::providers::configs::{
    AnthropicProviderConfig, GoogleProviderConfig, GroqProviderConfig, OpenAiProviderConfig,
    ProviderConfig, XaiProviderConfig,
};
use mathchat::providers::factory;
use mathchat::providers::unify::search_performed;
use mathchat::search::arxiv::{ArxivClient, ArxivConfig};
use mathchat::search::exa::{ExaClient, ExaConfig};
use mathchat::search::format_results;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Provider to chat with (API key read from the provider's environment variable)
    #[arg(short, long, default_value = "openai")]
    #[arg(value_enum)]
    provider: ProviderVariant,

    /// Model to use (defaults to the provider's default model)
    #[arg(short, long)]
    model: Option<String>,

    /// Augment each question with Exa web-search results (requires EXA_API_KEY)
    #[arg(long)]
    search: bool,

    /// Augment each question with arXiv paper abstracts
    #[arg(long)]
    arxiv: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ProviderVariant {
    OpenAi,
    Anthropic,
    Google,
    Groq,
    Xai,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let provider = factory::get_provider(provider_config(&cli)?)?;
    let exa = if cli.search {
        Some(ExaClient::new(ExaConfig::from_env()?)?)
    } else {
        None
    };
    let arxiv = if cli.arxiv {
        Some(ArxivClient::new(ArxivConfig::default())?)
    } else {
        None
    };

    println!(
        "mathchat {}",
        style("- type \"exit\" to end the session").dim()
    );
    println!();

    let mut history: Vec<Message> = Vec::new();

    loop {
        let message_text: String = input("Message:").placeholder("").multiline().interact()?;

        if message_text.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        let spin = spinner();
        spin.start("awaiting reply");

        let query = message_text.trim();
        let mut context_blocks = Vec::new();
        if let Some(exa) = &exa {
            match exa.search(query).await {
                Ok(results) if !results.is_empty() => {
                    context_blocks.push(format_results(query, &results));
                }
                Ok(_) => {}
                Err(e) => {
                    println!("{}", style(format!("search failed: {e}")).dim());
                }
            }
        }
        if let Some(arxiv) = &arxiv {
            match arxiv.search(query).await {
                Ok(results) if !results.is_empty() => {
                    context_blocks.push(format_results(query, &results));
                }
                Ok(_) => {}
                Err(e) => {
                    println!("{}", style(format!("arXiv lookup failed: {e}")).dim());
                }
            }
        }
        let search_context = if context_blocks.is_empty() {
            None
        } else {
            Some(context_blocks.join("\n"))
        };

        let system = render_system_prompt(search_context.as_deref())?;
        history.push(Message::user(&message_text));

        let reply = match provider.complete(&system, &history).await {
            Ok(reply) => reply,
            Err(e) => {
                spin.stop(format!("{}", style(format!("request failed: {e}")).red()));
                history.pop();
                continue;
            }
        };

        spin.stop("");

        let rendered = normalize(&reply.message.content);
        if search_context.is_some() || search_performed(&rendered, &reply.tool_steps) {
            println!("{}", style("(web search used)").dim());
        }
        render(&rendered);

        history.push(reply.message);
        println!();
    }

    Ok(())
}

fn render(content: &str) {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .unwrap();
}

fn provider_config(cli: &Cli) -> Result<ProviderConfig> {
    let mut config = match cli.provider {
        ProviderVariant::OpenAi => ProviderConfig::OpenAi(OpenAiProviderConfig::from_env()?),
        ProviderVariant::Anthropic => {
            ProviderConfig::Anthropic(AnthropicProviderConfig::from_env()?)
        }
        ProviderVariant::Google => ProviderConfig::Google(GoogleProviderConfig::from_env()?),
        ProviderVariant::Groq => ProviderConfig::Groq(GroqProviderConfig::from_env()?),
        ProviderVariant::Xai => ProviderConfig::Xai(XaiProviderConfig::from_env()?),
    };

    if let Some(model) = &cli.model {
        match &mut config {
            ProviderConfig::OpenAi(c) => c.model = model.clone(),
            ProviderConfig::Anthropic(c) => c.model = model.clone(),
            ProviderConfig::Google(c) => c.model = model.clone(),
            ProviderConfig::Groq(c) => c.model = model.clone(),
            ProviderConfig::Xai(c) => c.model = model.clone(),
        }
    }

    Ok(config)
}
