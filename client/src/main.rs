//! Warta command-line client
//!
//! A terminal front end over the client core: session management, the news
//! feeds, the contact directory, and a live conversation view driven by the
//! sync engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use warta_api::{ApiClient, ApiConfig, FileTokenStore, Route};
use warta_core::{ArticleDraft, NewMessageRequest, RegisterRequest};
use warta_sync::{ConversationSync, SyncConfig, SyncEvent};

fn cli() -> Command {
    Command::new("warta")
        .version(env!("CARGO_PKG_VERSION"))
        .about("News reader and chat client")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML config file (base_url, timeouts, retry)"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory for the persisted session (default: ~/.warta)"),
        )
        .subcommand(
            Command::new("login")
                .about("Authenticate and persist the session")
                .arg(Arg::new("email").required(true))
                .arg(Arg::new("password").required(true)),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("password").long("password").required(true))
                .arg(Arg::new("role").long("role").default_value("Narasumber"))
                .arg(Arg::new("media").long("media").default_value("")),
        )
        .subcommand(Command::new("logout").about("Drop the persisted session"))
        .subcommand(Command::new("whoami").about("Show the authenticated account"))
        .subcommand(
            Command::new("feed")
                .about("List news headlines")
                .arg(
                    Arg::new("category")
                        .long("category")
                        .help("Restrict to a category"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Unabridged category listing"),
                )
                .arg(
                    Arg::new("breaking")
                        .long("breaking")
                        .action(ArgAction::SetTrue)
                        .help("Breaking news instead of the front page"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search articles by title")
                .arg(Arg::new("query").required(true)),
        )
        .subcommand(
            Command::new("read")
                .about("Show one article")
                .arg(Arg::new("slug").required(true)),
        )
        .subcommand(
            Command::new("publish")
                .about("Submit a new article")
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("content").long("content").required(true))
                .arg(
                    Arg::new("update")
                        .long("update")
                        .value_name("SLUG")
                        .help("Update this slug instead of creating"),
                ),
        )
        .subcommand(Command::new("my-articles").about("List your own articles"))
        .subcommand(Command::new("categories").about("List article categories"))
        .subcommand(
            Command::new("contacts")
                .about("Browse the contact directory")
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("keyword").long("keyword")),
        )
        .subcommand(Command::new("conversations").about("List open conversations"))
        .subcommand(
            Command::new("send")
                .about("Send one message")
                .arg(Arg::new("peer").required(true).help("Recipient email"))
                .arg(Arg::new("message").required(true)),
        )
        .subcommand(
            Command::new("watch")
                .about("Follow a conversation live until Ctrl-C")
                .arg(Arg::new("peer").required(true).help("Peer email"))
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .default_value("3")
                        .value_parser(value_parser!(u64))
                        .help("Poll interval in seconds"),
                ),
        )
}

fn data_dir(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".warta")
        })
}

fn build_client(matches: &ArgMatches) -> anyhow::Result<ApiClient> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ApiConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ApiConfig::default(),
    };

    let dir = data_dir(matches);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating data directory {}", dir.display()))?;

    let tokens = Arc::new(FileTokenStore::new(&dir));
    Ok(ApiClient::new(config, tokens)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let client = build_client(&matches)?;

    match matches.subcommand() {
        Some(("login", args)) => {
            let email = args.get_one::<String>("email").unwrap();
            let password = args.get_one::<String>("password").unwrap();
            let user = client.login(email, password).await?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        Some(("register", args)) => {
            let request = RegisterRequest {
                name: args.get_one::<String>("name").unwrap().clone(),
                role: args.get_one::<String>("role").unwrap().clone(),
                media: args.get_one::<String>("media").unwrap().clone(),
                email: args.get_one::<String>("email").unwrap().to_lowercase(),
                password: args.get_one::<String>("password").unwrap().clone(),
                password_confirmation: args.get_one::<String>("password").unwrap().clone(),
            };
            client.register(&request).await?;
            println!("Registered {}. Log in to continue.", request.email);
        }
        Some(("logout", _)) => {
            client.logout()?;
            println!("Session cleared.");
        }
        Some(("whoami", _)) => match client.initial_route() {
            Route::Login => println!("Not logged in."),
            Route::Main => {
                let user = client.current_user().await?;
                println!("{} <{}>", user.name, user.email);
                if let Some(role) = &user.role {
                    println!("Role: {role}");
                }
                if let Some(media) = &user.media {
                    println!("Media: {media}");
                }
            }
        },
        Some(("feed", args)) => {
            let articles = if let Some(category) = args.get_one::<String>("category") {
                client
                    .news_by_category(category, args.get_flag("all"))
                    .await?
            } else if args.get_flag("breaking") {
                client.breaking_news().await?
            } else {
                client.news_feed().await?
            };
            print_articles(&articles);
        }
        Some(("search", args)) => {
            let query = args.get_one::<String>("query").unwrap();
            let articles = client.search_news(query).await?;
            print_articles(&articles);
        }
        Some(("read", args)) => {
            let slug = args.get_one::<String>("slug").unwrap();
            let article = client.news_details(slug).await?;
            println!("{}", article.title);
            if let Some(category) = &article.category {
                println!("[{category}]");
            }
            if let Some(created_at) = &article.created_at {
                println!("{created_at}");
            }
            println!();
            if let Some(content) = &article.content {
                println!("{content}");
            }
        }
        Some(("publish", args)) => {
            let draft = ArticleDraft {
                judul_berita: args.get_one::<String>("title").unwrap().clone(),
                category: args.get_one::<String>("category").unwrap().clone(),
                content: args.get_one::<String>("content").unwrap().clone(),
            };
            match args.get_one::<String>("update") {
                Some(slug) => {
                    client.update_article(slug, &draft).await?;
                    println!("Updated {slug}.");
                }
                None => {
                    client.create_article(&draft).await?;
                    println!("Submitted \"{}\".", draft.judul_berita);
                }
            }
        }
        Some(("my-articles", _)) => {
            let articles = client.list_by_author().await?;
            print_articles(&articles);
        }
        Some(("categories", _)) => {
            for category in client.list_categories().await? {
                println!("{}", category.name);
            }
        }
        Some(("contacts", args)) => {
            let contacts = client
                .list_contacts(
                    args.get_one::<String>("category").map(String::as_str),
                    args.get_one::<String>("keyword").map(String::as_str),
                )
                .await?;
            if contacts.is_empty() {
                println!("No contacts found.");
            }
            for contact in contacts {
                let role = contact.role.as_deref().unwrap_or("-");
                println!("{} <{}> ({role})", contact.name, contact.email);
            }
        }
        Some(("conversations", _)) => {
            let rows = client.list_conversations().await?;
            if rows.is_empty() {
                println!("No conversations yet.");
            }
            for row in rows {
                let latest = row.latest_message.as_deref().unwrap_or("");
                println!("{}: {latest}", row.name);
            }
        }
        Some(("send", args)) => {
            let user = client.current_user().await?;
            let request = NewMessageRequest {
                sender: user.email,
                to: args.get_one::<String>("peer").unwrap().clone(),
                message: args.get_one::<String>("message").unwrap().clone(),
            };
            client.post_message(&request).await?;
            println!("Sent.");
        }
        Some(("watch", args)) => {
            let peer = args.get_one::<String>("peer").unwrap().clone();
            let interval = *args.get_one::<u64>("interval").unwrap();
            watch(client, peer, Duration::from_secs(interval)).await?;
        }
        _ => unreachable!("arg_required_else_help"),
    }

    Ok(())
}

fn print_articles(articles: &[warta_core::Article]) {
    if articles.is_empty() {
        println!("No articles.");
        return;
    }
    for article in articles {
        let category = article.category.as_deref().unwrap_or("-");
        println!("{:<30} [{category}] {}", article.slug, article.title);
    }
}

/// Follow one conversation: print the history, then every change the sync
/// engine observes, until Ctrl-C.
async fn watch(client: ApiClient, peer: String, interval: Duration) -> anyhow::Result<()> {
    let config = SyncConfig::new().with_poll_interval(interval);
    let (sync, mut events) = ConversationSync::spawn(client, peer.clone(), config).await?;
    let me = sync.local_user().email.clone();
    println!("Watching conversation with {peer} (Ctrl-C to stop)");

    let mut snapshots = sync.subscribe();
    let mut printed = 0usize;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                // The list can shrink when an optimistic record reconciles;
                // reprint from scratch in that case
                if snapshot.messages.len() < printed {
                    printed = 0;
                }
                for message in &snapshot.messages[printed..] {
                    let who = if message.sender == me {
                        "you"
                    } else {
                        message.sender.as_str()
                    };
                    println!("[{}] {}: {}", message.created_at, who, message.message);
                }
                printed = snapshot.messages.len();
            }
            event = events.recv() => {
                match event {
                    Some(SyncEvent::FetchFailed { error }) => {
                        eprintln!("fetch failed, showing last known messages: {error}");
                    }
                    Some(SyncEvent::SendFailed { error }) => {
                        eprintln!("send failed: {error}");
                    }
                    Some(SyncEvent::Refreshed { .. }) => {}
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                sync.shutdown().await;
                break;
            }
        }
    }

    Ok(())
}
