use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use mscroller_app::{AgentStores, HostEvent, PageAgent, RunOutcome, Scheduler, SimulatedPage};
use mscroller_core::protocol::Request;
use mscroller_core::AgentConfig;
use mscroller_engine::{MemorySessionStorage, PageDocument};

#[derive(Args)]
pub struct SimulateArgs {
    /// Address of the simulated page
    #[arg(long, default_value = "https://reader.example/series/demo/chapter-1")]
    url: String,

    /// Page markup to load; a stub page is generated when absent
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Next-chapter link placed in the generated stub page
    #[arg(long, value_name = "URL")]
    next: Option<String>,

    /// Total scrollable height in pixels
    #[arg(long, default_value_t = 6000.0)]
    content_height: f64,

    /// Visible height in pixels
    #[arg(long, default_value_t = 900.0)]
    viewport_height: f64,

    /// Speed pushed to the agent before it starts
    #[arg(long)]
    speed: Option<i64>,

    /// Virtual seconds to run for
    #[arg(long, default_value_t = 300)]
    seconds: u64,
}

pub fn execute(args: &SimulateArgs, config: AgentConfig, data_dir: &Path) -> Result<()> {
    let document = match &args.file {
        Some(path) => super::load_page(&args.url, Some(path.as_path()), None)?,
        None => PageDocument::parse(&args.url, &stub_page(args.next.as_deref()))?,
    };
    let host = SimulatedPage::new(document, args.viewport_height, args.content_height);
    let stores = AgentStores::open(data_dir, Arc::new(MemorySessionStorage::new()))?;

    let mut agent = PageAgent::start(host, stores, config, Scheduler::new());
    if let Some(speed) = args.speed {
        agent.handle_request(Request::UpdateSpeed { speed })?;
    }
    agent.handle_request(Request::ShowPanel)?;
    agent.handle_request(Request::Toggle)?;

    let outcome = agent.run_for(args.seconds as f64 * 1000.0);
    let info = agent.info();
    agent.unload();

    for event in agent.host().events() {
        match event {
            HostEvent::Toast(toast) => {
                println!("{:>9.3}s  toast     {}", toast.shown_at_ms / 1000.0, toast.text);
            }
            HostEvent::Navigated { url, at_ms } => {
                println!("{:>9.3}s  navigate  {}", at_ms / 1000.0, url);
            }
            HostEvent::PanelConstructed | HostEvent::KeyboardCapture(_) => {}
        }
    }

    println!();
    println!("title:     {}", info.title);
    println!("chapter:   {}", info.chapter);
    println!("speed:     {}", info.speed);
    println!(
        "scrolled:  {:.0}px of {:.0}px in {} frames",
        agent.host().scroll_y(),
        args.content_height,
        agent.scheduler().frames_delivered()
    );
    match outcome {
        RunOutcome::Navigated(url) => println!("outcome:   left for {url}"),
        RunOutcome::Closed => println!("outcome:   unloaded"),
        RunOutcome::Idle => println!("outcome:   stopped"),
        RunOutcome::TimeLimit => println!("outcome:   still running after {}s", args.seconds),
    }
    Ok(())
}

fn stub_page(next: Option<&str>) -> String {
    let link = next
        .map(|url| format!(r#"<a rel="next" href="{url}">Next</a>"#))
        .unwrap_or_default();
    format!(
        "<html><head><title>Demo Series - Chapter 1</title></head>\
         <body><h1 class=\"manga-title\">Demo Series</h1>{link}</body></html>"
    )
}
