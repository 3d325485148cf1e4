use clap::{Parser, Subcommand};
use log::info;
use rsimilar::clients::{
    LastFmClient, LocalStorage,
    entities::Track,
    errors::{Error, Result, RetryError},
};
use rsimilar::recommender::{ConfigBuilder, Recommender, Session};

#[derive(Parser)]
#[command(name = "rsimilar")]
#[command(version, about = "Find tracks similar to a song using Last.fm", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend tracks similar to a song
    Recommend {
        #[arg(short, long)]
        song: String,
        #[arg(short, long)]
        artist: String,
        /// Number of recommendations
        #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(1..=50))]
        limit: u8,
        /// Save the list for this user so it can be retried later
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Start over from the first track of the user's saved list
    Retry {
        #[arg(short, long)]
        user: String,
        #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(1..=50))]
        limit: u8,
    },
    /// Show the user's saved list
    ///
    /// After a retry that found nothing, this is the remaining retry queue
    /// rather than the last recommendations.
    History {
        #[arg(short, long)]
        user: String,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    info!("Building config ...");
    let config = ConfigBuilder::new().build().await?;
    config.storage.init_db().await?;
    let storage = config.storage;
    let recommender = Recommender::new(config.lastfm);

    let result = match &cli.command {
        Commands::Recommend {
            song,
            artist,
            limit,
            user,
        } => {
            recommend(
                &recommender,
                &storage,
                song,
                artist,
                usize::from(*limit),
                user.as_deref(),
            )
            .await
        }
        Commands::Retry { user, limit } => {
            retry(&recommender, &storage, user, usize::from(*limit)).await
        }
        Commands::History { user } => history(&storage, user).await,
    };

    match result {
        Err(Error::InvalidUsername) => {
            println!("Please provide a non-empty username.");
            Ok(())
        }
        other => other,
    }
}

fn print_tracks(tracks: &[Track]) {
    for (idx, track) in tracks.iter().enumerate() {
        println!("{:>2}. {track}", idx + 1);
    }
}

async fn recommend(
    recommender: &Recommender<LastFmClient>,
    storage: &LocalStorage,
    song: &str,
    artist: &str,
    limit: usize,
    user: Option<&str>,
) -> Result<()> {
    if song.trim().is_empty() || artist.trim().is_empty() {
        println!("Please provide both the song and artist names.");
        return Ok(());
    }
    // Resolve the user first so a bad name fails before any API call
    let user_id = match user {
        Some(name) => Some(storage.add_or_get_user(name).await?),
        None => None,
    };

    let mut session = Session::new();
    let recs = session.recommend(recommender, song, artist, limit).await;
    if recs.is_empty() {
        println!("No recommendations found. Try a different song or artist.");
        return Ok(());
    }
    println!("Recommendations for {song} by {artist}:");
    print_tracks(recs);

    if let Some(user_id) = user_id {
        storage
            .save_recommendations(user_id, &session.recommendations)
            .await?;
        println!("Saved {} tracks.", session.recommendations.len());
    }
    Ok(())
}

async fn retry(
    recommender: &Recommender<LastFmClient>,
    storage: &LocalStorage,
    user: &str,
    limit: usize,
) -> Result<()> {
    let user_id = storage.add_or_get_user(user).await?;
    let mut session = Session::from_saved(storage.load_recommendations(user_id).await?);
    if let Some(head) = session.retry_queue.peek_head() {
        println!("Retry with: {head}");
    }

    match session.retry(recommender, limit).await {
        Ok(recs) => {
            println!("New recommendations found:");
            print_tracks(recs);
        }
        Err(RetryError::NoResults) => println!("{}", RetryError::NoResults),
        Err(RetryError::EmptyQueue) => {
            println!("{}", RetryError::EmptyQueue);
            return Ok(());
        }
    }

    // After a success the queue holds the new list, otherwise what is left of the old one
    storage
        .save_recommendations(user_id, &session.retry_queue.to_vec())
        .await?;
    if let Some(next) = session.retry_queue.peek_head() {
        println!("Next retry starts from: {next}");
    }
    Ok(())
}

async fn history(storage: &LocalStorage, user: &str) -> Result<()> {
    let user_id = storage.add_or_get_user(user).await?;
    let tracks = storage.load_recommendations(user_id).await?;
    if tracks.is_empty() {
        println!("No saved recommendations for {}.", user.trim());
    } else {
        print_tracks(&tracks);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_history_help_mentions_retry_queue() {
        let mut cmd = Cli::command();
        let history = cmd.find_subcommand_mut("history").unwrap();
        let help = history.render_long_help().to_string();
        assert!(help.contains("remaining retry queue"), "{help}");
    }

    #[test]
    fn test_limit_range() {
        assert!(Cli::try_parse_from(["rsimilar", "retry", "--user", "a", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["rsimilar", "retry", "--user", "a", "--limit", "51"]).is_err());
        assert!(Cli::try_parse_from(["rsimilar", "retry", "--user", "a", "--limit", "50"]).is_ok());
    }
}
