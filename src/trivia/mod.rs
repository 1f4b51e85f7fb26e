//! Three unrelated one-shot fetches shown alongside the chat: a cat
//! fact, a joke, and a piece of advice. Each is independent of the
//! others; a failure is logged and leaves its field in the loading state.

use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

const CAT_FACT_URL: &str = "https://catfact.ninja/fact";
const JOKE_URL: &str = "https://official-joke-api.appspot.com/random_joke";
const ADVICE_URL: &str = "https://api.adviceslip.com/advice";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriviaKind {
    CatFact,
    Joke,
    Advice,
}

/// One resolved trivia value, delivered over the app event channel.
#[derive(Debug)]
pub struct TriviaEvent {
    pub kind: TriviaKind,
    pub text: String,
}

/// Three independent optional values, each populated at most once per run.
#[derive(Debug, Default)]
pub struct TriviaBoard {
    fact: Option<String>,
    joke: Option<String>,
    advice: Option<String>,
}

impl TriviaBoard {
    pub fn set(&mut self, kind: TriviaKind, text: String) {
        match kind {
            TriviaKind::CatFact => self.fact = Some(text),
            TriviaKind::Joke => self.joke = Some(text),
            TriviaKind::Advice => self.advice = Some(text),
        }
    }

    pub fn get(&self, kind: TriviaKind) -> Option<&str> {
        match kind {
            TriviaKind::CatFact => self.fact.as_deref(),
            TriviaKind::Joke => self.joke.as_deref(),
            TriviaKind::Advice => self.advice.as_deref(),
        }
    }
}

#[derive(Deserialize)]
struct CatFactPayload {
    fact: String,
}

#[derive(Deserialize)]
struct JokePayload {
    setup: String,
    punchline: String,
}

#[derive(Deserialize)]
struct AdvicePayload {
    slip: AdviceSlip,
}

#[derive(Deserialize)]
struct AdviceSlip {
    advice: String,
}

async fn fetch_cat_fact(client: &reqwest::Client) -> anyhow::Result<String> {
    let payload: CatFactPayload = client
        .get(CAT_FACT_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(payload.fact)
}

async fn fetch_joke(client: &reqwest::Client) -> anyhow::Result<String> {
    let payload: JokePayload = client
        .get(JOKE_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(format!("{} — {}", payload.setup, payload.punchline))
}

async fn fetch_advice(client: &reqwest::Client) -> anyhow::Result<String> {
    let payload: AdvicePayload = client
        .get(ADVICE_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(payload.slip.advice)
}

/// Fire the three one-shot fetches.
///
/// Fire-and-forget with respect to each other: each task reports only
/// its own result. No retry, no timeout; the operation is idempotent
/// and runs once per startup.
pub fn spawn_fetches(client: reqwest::Client, tx: UnboundedSender<TriviaEvent>) {
    for kind in [TriviaKind::CatFact, TriviaKind::Joke, TriviaKind::Advice] {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = match kind {
                TriviaKind::CatFact => fetch_cat_fact(&client).await,
                TriviaKind::Joke => fetch_joke(&client).await,
                TriviaKind::Advice => fetch_advice(&client).await,
            };
            match result {
                Ok(text) => {
                    let _ = tx.send(TriviaEvent { kind, text });
                }
                Err(error) => warn!(?kind, error = %error, "trivia fetch failed"),
            }
        });
    }
}
