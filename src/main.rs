use glam::Vec3;
use tracing::{error, info, warn};

use realmwalk::assets::{FsFetcher, LoadEvent, Pipeline, WorldDescriptor};
use realmwalk::config::Config;
use realmwalk::controller::{CaptureHost, FrameContext, InputEvent};
use realmwalk::{logging, view};

/// Headless capture host: windowing belongs to the embedding, so the native
/// demo only logs the side effects.
struct LoggingHost;

impl CaptureHost for LoggingHost {
    fn request_capture(&mut self) {
        info!("pointer capture requested");
    }

    fn release_capture(&mut self) {
        info!("pointer capture released");
    }
}

fn main() {
    logging::init();
    let config = Config::default();

    // Optional argument: directory containing the Resources/ tree.
    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    info!("loading world from {root}");

    let fetcher = FsFetcher::new(&root);
    let pipeline = Pipeline::new(WorldDescriptor::mortal_realm(), &config);

    let mut world = None;
    pollster::block_on(pipeline.run(&fetcher, |event| match event {
        LoadEvent::Progress(update) => {
            if let Some(fraction) = update.fraction {
                info!("loading {:.0}%", fraction * 100.0);
            }
        }
        LoadEvent::PartialFailure { resource, cause } => {
            warn!("continuing without {resource}: {cause}");
        }
        LoadEvent::Complete(asset) => world = Some(asset),
        LoadEvent::FatalFailure(e) => error!("could not load world: {e}"),
    }));

    let Some(world) = world else {
        std::process::exit(1);
    };

    for surface in view::draw_list(&world) {
        info!(
            submesh = %surface.submesh.name,
            repeat = surface.repeat,
            "bound {:?}",
            surface.appearance
        );
    }

    // Scripted walk so the whole frame path runs without a window: resume,
    // walk forward, jump once, finish with a sprint.
    let mut ctx = FrameContext::new(config, 800, 600, Vec3::new(0.0, 0.0, 15.0));
    let mut host = LoggingHost;
    ctx.session.resume(&mut host);
    ctx.handle_event(&InputEvent::KeyDown("w".into()));

    let mut now = 0.0;
    for frame in 0..300u32 {
        match frame {
            60 => ctx.handle_event(&InputEvent::KeyDown(" ".into())),
            61 => ctx.handle_event(&InputEvent::KeyUp(" ".into())),
            120 => ctx.handle_event(&InputEvent::KeyDown("Shift".into())),
            _ => {}
        }
        now += 16.0;
        let pose = ctx.tick(now, &mut host);
        if frame % 60 == 0 {
            info!(
                "frame {frame}: pos ({:.2}, {:.2}, {:.2}) heading {:.0} deg",
                pose.position.x,
                pose.position.y,
                pose.position.z,
                ctx.player.yaw_degrees()
            );
        }
    }
    info!("walk demo finished");
}
