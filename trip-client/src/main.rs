use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use trip_client::ai::{AiClient, Budget, CoursePreferences};
use trip_client::api::{ApiClient, Signup};
use trip_client::cache::CachedApiClient;
use trip_client::config::ClientConfig;
use trip_client::domain::{ContentLink, Course, Itinerary, VisitTime};
use trip_client::reorder::{ItineraryEditor, SpotPosition, TimeWindow, retime_all};
use trip_client::session::{self, SessionStore};

/// trip - plan, reorder and share travel itineraries
#[derive(Parser)]
#[command(name = "trip")]
#[command(version, about)]
struct Cli {
    /// Backend base URL (overrides TRIP_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// AI service base URL (overrides TRIP_AI_URL)
    #[arg(long, global = true)]
    ai_url: Option<String>,

    /// Session file (overrides TRIP_SESSION_PATH)
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Signup {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        nickname: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Set the display name used on the community board
    Nickname { nickname: String },

    /// List saved courses
    Courses,

    /// Show a saved course with its spot positions
    Show {
        course_id: String,
        /// Also print the geocoded route
        #[arg(long)]
        route: bool,
    },

    /// Move a spot; positions are `day index` pairs as printed by `show`
    Move {
        course_id: String,
        src_day: usize,
        src_index: usize,
        dest_day: usize,
        dest_index: usize,
        /// Save the result to the backend
        #[arg(long)]
        save: bool,
    },

    /// Delete a spot
    DeleteSpot {
        course_id: String,
        day: usize,
        index: usize,
        #[arg(long)]
        save: bool,
    },

    /// Rename a saved course
    Rename { course_id: String, name: String },

    /// Delete a saved course
    Remove { course_id: String },

    /// Build a course from a travel video or blog post
    Extract {
        link: String,
        /// Day of the trip (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        save: bool,
    },

    /// Generate a course from preferences
    Generate {
        region: String,
        /// Area within the region; repeat for several
        #[arg(long = "area", required = true)]
        areas: Vec<String>,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// high, upper-middle, medium, lower-middle or low (or the level labels)
        #[arg(long, default_value_t = Budget::Medium)]
        budget: Budget,
        /// Age group of the travellers; repeat for several
        #[arg(long = "age")]
        ages: Vec<String>,
        #[arg(long)]
        save: bool,
    },

    /// List community posts
    Articles,

    /// Show a community post and its comments
    Article { id: i64 },

    /// Like or unlike a post
    Like { id: i64 },

    /// Comment on a post
    Comment { id: i64, text: String },

    /// Re-time an itinerary or course JSON file without contacting the backend
    Retime {
        file: PathBuf,
        /// First visit of the day
        #[arg(long, default_value = "08:00")]
        start: VisitTime,
        /// Minutes from the first to the last visit
        #[arg(long, default_value_t = 720)]
        length: u32,
        /// Overwrite the file instead of printing
        #[arg(long)]
        write: bool,
    },
}

struct App {
    api: CachedApiClient,
    ai: AiClient,
    store: SessionStore,
}

impl App {
    fn connect(config: &ClientConfig) -> anyhow::Result<Self> {
        let store = config.session_store();
        let saved = store
            .load()
            .with_context(|| format!("reading session from {}", store.path().display()))?
            .unwrap_or_default();

        let (writer, reader) = session::channel(saved);
        let api = ApiClient::new(config.api(), writer.with_store(store.clone()))?;
        let ai = AiClient::new(config.ai(), reader)?;

        Ok(Self {
            api: CachedApiClient::new(api, &config.route_cache),
            ai,
            store,
        })
    }

    fn client(&self) -> &ApiClient {
        self.api.client()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_base_url(url);
    }
    if let Some(url) = cli.ai_url {
        config = config.with_ai_base_url(url);
    }
    if let Some(path) = cli.session {
        config = config.with_session_path(path);
    }

    let app = App::connect(&config)?;
    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = app.client().login(&email, &password).await?;
            match user {
                Some(user) => println!("Signed in as {}", user.display_name()),
                None => println!("Signed in as {email}"),
            }
        }
        Command::Signup {
            email,
            password,
            nickname,
        } => {
            let message = app
                .client()
                .signup(&Signup {
                    email,
                    password,
                    nickname,
                })
                .await?;
            println!("{message}");
        }
        Command::Logout => {
            app.client().logout();
            app.store.clear()?;
            println!("Signed out");
        }
        Command::Whoami => {
            if !app.client().session().is_signed_in() {
                bail!("not signed in; run `trip login`");
            }
            let user = app.client().me().await?;
            println!("{} <{}>", user.display_name(), user.email);
            if let Some(expires) = app
                .client()
                .session()
                .access_token()
                .and_then(|t| t.claims().ok())
                .and_then(|c| c.expires_at())
            {
                println!("Token expires {}", expires.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
            }
        }
        Command::Nickname { nickname } => {
            app.client().set_nickname(&nickname).await?;
            println!("Nickname set to {nickname}");
        }
        Command::Courses => {
            let courses = app.client().list_courses().await?;
            if courses.is_empty() {
                println!("No saved courses");
            }
            for course in &courses {
                print_course_line(course);
            }
        }
        Command::Show { course_id, route } => {
            let course = app.client().course(&course_id).await?;
            print_course(&course);
            if route && !course.hides_map() {
                let route = app.api.route(&course_id).await?;
                println!();
                println!("Route:");
                for point in &route.coordinates {
                    println!(
                        "  {:>5}  {} ({:.5}, {:.5})",
                        point.time, point.name, point.latitude, point.longitude
                    );
                }
            }
        }
        Command::Move {
            course_id,
            src_day,
            src_index,
            dest_day,
            dest_index,
            save,
        } => {
            let course = app.client().course(&course_id).await?;
            let mut editor = ItineraryEditor::new(course.days.clone());
            editor.move_spot(
                SpotPosition::new(src_day, src_index),
                SpotPosition::new(dest_day, dest_index),
            )?;
            finish_edit(app, &course_id, course, editor, save).await?;
        }
        Command::DeleteSpot {
            course_id,
            day,
            index,
            save,
        } => {
            let course = app.client().course(&course_id).await?;
            let mut editor = ItineraryEditor::new(course.days.clone());
            editor.delete_spot(SpotPosition::new(day, index))?;
            finish_edit(app, &course_id, course, editor, save).await?;
        }
        Command::Rename { course_id, name } => {
            app.client().rename_course(&course_id, &name).await?;
            println!("Renamed {course_id} to {name}");
        }
        Command::Remove { course_id } => {
            app.api.delete_course(&course_id).await?;
            println!("Deleted {course_id}");
        }
        Command::Extract { link, date, save } => {
            let link = ContentLink::parse(&link)?;
            let schedule = app.ai.extract_content(&link).await?;
            if !schedule.summary.is_empty() {
                println!("{}", schedule.summary);
                println!();
            }
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let course = schedule.into_course(&link, date);
            save_or_print(app, course, save).await?;
        }
        Command::Generate {
            region,
            areas,
            from,
            to,
            budget,
            ages,
            save,
        } => {
            let preferences = CoursePreferences::new(&region, areas, from, to)?
                .with_budget(budget)
                .with_age_groups(ages);
            let generated = app.ai.generate_course(&preferences).await?;
            let course = generated.into_course(preferences.region());
            save_or_print(app, course, save).await?;
        }
        Command::Articles => {
            for article in app.client().list_articles().await? {
                println!(
                    "{:>5}  {}  by {}  ({} views, {} likes)",
                    article.id,
                    article.title,
                    article.nickname.as_deref().unwrap_or("unknown"),
                    article.view_count,
                    article.like_count
                );
            }
        }
        Command::Article { id } => {
            if let Err(e) = app.client().record_view(id).await {
                warn!(id, error = %e, "could not record view");
            }
            let page = app.client().load_article_page(id).await?;
            let article = &page.article;
            println!("{}", article.title);
            println!(
                "by {}  ({} views, {} likes{})",
                article.nickname.as_deref().unwrap_or("unknown"),
                article.view_count,
                article.like_count,
                if article.likecheck { ", liked" } else { "" }
            );
            println!();
            println!("{}", article.content);
            for url in &article.file_urls {
                println!("  [attachment] {url}");
            }
            if !page.comments.is_empty() {
                println!();
                println!("Comments:");
            }
            for comment in &page.comments {
                println!(
                    "  {}{}: {}",
                    comment.nickname.as_deref().unwrap_or("unknown"),
                    if comment.minecheck { " (you)" } else { "" },
                    comment.content
                );
            }
        }
        Command::Like { id } => {
            let status = app.client().toggle_like(id).await?;
            let verb = if status.likecheck { "Liked" } else { "Unliked" };
            println!("{verb} post {id} ({} likes)", status.like_count);
        }
        Command::Comment { id, text } => {
            let comment = app.client().add_comment(id, &text).await?;
            println!("Added comment {}", comment.id);
        }
        Command::Retime {
            file,
            start,
            length,
            write,
        } => {
            let window = TimeWindow::new(start, length)?;
            retime_file(&file, &window, write)?;
        }
    }
    Ok(())
}

/// Print the edited itinerary and save it when asked.
async fn finish_edit(
    app: &App,
    course_id: &str,
    mut course: Course,
    mut editor: ItineraryEditor,
    save: bool,
) -> anyhow::Result<()> {
    course.days = editor.itinerary().clone();
    print_course(&course);

    if save {
        app.api
            .replace_course(course_id, &course)
            .await
            .context("saving the edited course")?;
        editor.mark_saved();
        println!();
        println!("Saved");
    } else if editor.is_dirty() {
        println!();
        println!("Not saved; re-run with --save to keep this order");
    }
    Ok(())
}

async fn save_or_print(app: &App, course: Course, save: bool) -> anyhow::Result<()> {
    if save {
        let saved = app.client().save_course(&course).await?;
        print_course(&saved);
        println!();
        println!("Saved as {}", saved.id.as_deref().unwrap_or("?"));
    } else {
        print_course(&course);
    }
    Ok(())
}

fn print_course_line(course: &Course) {
    let id = course.id.as_deref().unwrap_or("-");
    let mut details = Vec::new();
    if let Some(region) = course.region_label() {
        details.push(region);
    }
    if let Some((first, last)) = course.date_range() {
        details.push(if first == last {
            first.to_string()
        } else {
            format!("{first} to {last}")
        });
    }
    if let Some(source) = course.source() {
        details.push(format!("from {source}"));
    }
    println!("{id}  {}  [{}]", course.name, details.join(", "));
}

fn print_course(course: &Course) {
    println!("{}", course.name);
    if let Some(location) = &course.location {
        println!("Source: {location}");
    }
    if !course.tags.is_empty() {
        println!("Tags: {}", course.tags.join(", "));
    }
    for (d, day) in course.days().iter().enumerate() {
        println!();
        println!("Day {d} ({})", day.date);
        if day.is_empty() {
            println!("  (no spots)");
        }
        for (i, spot) in day.spots.iter().enumerate() {
            let mut line = format!("  [{d} {i}] {:>5}  {}", spot.time, spot.name);
            if !spot.address.is_empty() {
                line.push_str(&format!(" - {}", spot.address));
            }
            println!("{line}");
        }
    }
}

/// A file `retime` accepts: a bare itinerary or a whole course.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Document {
    Itinerary(Itinerary),
    Course(Course),
}

fn retime_file(path: &Path, window: &TimeWindow, write: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut document: Document = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not an itinerary or course", path.display()))?;

    match &mut document {
        Document::Itinerary(itinerary) => retime_all(itinerary, window),
        Document::Course(course) => retime_all(&mut course.days, window),
    }

    let json = serde_json::to_string_pretty(&document)?;
    if write {
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(())
}
