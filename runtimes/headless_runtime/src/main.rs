// Headless Runtime - scripted two-peer hand session
//
// Peer 1 owns a right hand that walks through a fixed timeline (reach for a
// crate, grab it, throw it, point at the floor, teleport). Peer 2 only
// observes. Both share an in-process channel transport, and at the end the
// runtime checks that the observer replayed the owner's transitions exactly.

use std::path::PathBuf;

use anyhow::{bail, Context};
use cgmath::{vec3, Deg, EuclideanSpace, InnerSpace, Point3, Quaternion, Rotation3, Vector3, Zero};
use clap::Parser;
use handvr::{
    ButtonTracker, CameraRig, ChannelEndpoint, ChannelHub, HandAction, HandConfig, HandId,
    HandPose, Handedness, InputSnapshot, InteractableId, InteractionWorld, NoFade, ObjectTags,
    PeerId, PhysicsBackend, RapierPhysics, SimpleRig,
};
use tracing::{info, warn};

const OWNER: PeerId = PeerId(1);
const OBSERVER: PeerId = PeerId(2);

const NEAR_CRATE: InteractableId = InteractableId(1);
const FAR_CRATE: InteractableId = InteractableId(2);
const CRATE_RADIUS: f32 = 0.15;

// Distance at which the hand's grab sensor overlaps a crate.
const SENSOR_RADIUS: f32 = 0.25;

// Timeline, in seconds since start.
const GRAB_AT: f32 = 0.5;
const RELEASE_AT: f32 = 0.9;
const AIM_AT: f32 = 1.0;
const TELEPORT_AT: f32 = 1.2;

type Peer = InteractionWorld<RapierPhysics, SimpleRig, NoFade, ChannelEndpoint>;

#[derive(Parser)]
#[command(name = "headless_runtime")]
#[command(about = "Scripted owner/observer hand session without a headset")]
struct Args {
    /// Hand configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 180)]
    frames: u32,

    /// Frame time in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "headless_runtime=info,handvr=debug".into()),
        )
        .init();
    // Replication traffic is what this runtime exists to show.
    handvr::logging::init_logging_or("HANDVR_LOG", "warn,replication=debug");

    let args = Args::parse();
    if !(args.dt > 0.0) {
        bail!("--dt must be positive, got {}", args.dt);
    }

    let config = match &args.config {
        Some(path) => HandConfig::load(path)
            .with_context(|| format!("loading hand config from {}", path.display()))?,
        None => HandConfig::default(),
    };

    info!(
        "Running {} frames at dt={:.4}s (fade {:.2}s)",
        args.frames, args.dt, config.fade_duration
    );

    let mut endpoints = ChannelHub::connect(&[OWNER, OBSERVER]).into_iter();
    let mut owner = build_peer(OWNER, &config, endpoints.next().context("owner endpoint")?);
    let mut observer = build_peer(
        OBSERVER,
        &config,
        endpoints.next().context("observer endpoint")?,
    );

    let hand = owner.register_hand(Handedness::Right);
    observer.register_hand(Handedness::Right);

    let mut script = Script::new(&config, hand);
    for frame in 0..args.frames {
        let time = frame as f32 * args.dt;
        let input = script.frame(&mut owner, time);

        owner.tick(&input, args.dt);
        observer.tick(&InputSnapshot::new(), args.dt);
    }

    report(&owner, &observer, hand)
}

fn build_peer(peer: PeerId, config: &HandConfig, endpoint: ChannelEndpoint) -> Peer {
    let mut physics = RapierPhysics::new();
    physics.add_static_box(Point3::new(0.0, -0.5, 0.0), vec3(20.0, 0.5, 20.0));
    physics.add_interactable(NEAR_CRATE, Point3::new(0.4, 1.0, -0.4), CRATE_RADIUS);
    physics.add_interactable(FAR_CRATE, Point3::new(-1.5, 1.0, -0.8), CRATE_RADIUS);

    let mut rig = SimpleRig::new();
    for player in [OWNER, OBSERVER] {
        rig.insert_player(player, Point3::origin(), vec3(0.0, 1.6, 0.0));
    }

    InteractionWorld::new(peer, config.clone(), physics, rig, NoFade, endpoint)
}

/// Drives the owner's right hand through the timeline.
struct Script {
    hand: HandId,
    buttons: ButtonTracker,
    touching: Vec<InteractableId>,
}

impl Script {
    fn new(config: &HandConfig, hand: HandId) -> Self {
        Script {
            hand,
            buttons: ButtonTracker::new(config),
            touching: Vec::new(),
        }
    }

    fn frame(&mut self, owner: &mut Peer, time: f32) -> InputSnapshot {
        let side = self.hand.side;
        let pose = self.pose_at(time);
        self.sense_proximity(owner, pose.position);

        let mut input = InputSnapshot::new().with_pose(side, pose);
        let grab_level = if (GRAB_AT..RELEASE_AT).contains(&time) { 1.0 } else { 0.0 };
        let teleport_level = if (AIM_AT..TELEPORT_AT).contains(&time) { 1.0 } else { 0.0 };
        self.buttons.feed(&mut input, HandAction::Grab, side, grab_level);
        self.buttons.feed(&mut input, HandAction::Teleport, side, teleport_level);
        input
    }

    fn pose_at(&self, time: f32) -> HandPose {
        let start = Point3::new(0.0, 1.2, 0.4);
        let crate_position = Point3::new(0.4, 1.0, -0.4);

        if time < GRAB_AT {
            let t = time / GRAB_AT;
            let position = start + (crate_position - start) * t;
            HandPose::at(position).with_velocity((crate_position - start) / GRAB_AT, Vector3::zero())
        } else if time < AIM_AT {
            // Upward swing with a flick of the wrist.
            let swing = vec3(0.0, 5.0, -1.0);
            let position = crate_position + swing * (time - GRAB_AT);
            HandPose::at(position).with_velocity(swing, vec3(2.0, 0.0, 0.0))
        } else {
            HandPose::at(Point3::new(0.0, 1.0, 0.0))
                .with_rotation(Quaternion::from_angle_x(Deg(-40.0)))
        }
    }

    /// Stand-in for the hand's trigger volume: overlap is a distance check.
    fn sense_proximity(&mut self, owner: &mut Peer, position: Point3<f32>) {
        for object in [NEAR_CRATE, FAR_CRATE] {
            let Some(center) = owner.physics().body_position(object) else {
                continue;
            };
            let inside = (center - position).magnitude() <= SENSOR_RADIUS + CRATE_RADIUS;
            let was_inside = self.touching.contains(&object);

            if inside && !was_inside {
                self.touching.push(object);
                owner.on_proximity_enter(self.hand, object, ObjectTags::INTERACTABLE);
            } else if !inside && was_inside {
                self.touching.retain(|other| *other != object);
                owner.on_proximity_exit(self.hand, object, ObjectTags::INTERACTABLE);
            }
        }
    }
}

fn report(owner: &Peer, observer: &Peer, hand: HandId) -> anyhow::Result<()> {
    let mut agree = true;

    for object in [NEAR_CRATE, FAR_CRATE] {
        let holders = (
            owner.interactables().holder(object),
            observer.interactables().holder(object),
        );
        let velocities = (
            owner.physics().body_velocity(object),
            observer.physics().body_velocity(object),
        );
        info!(
            "{}: holder owner={:?} observer={:?}, velocity owner={:?} observer={:?}",
            object, holders.0, holders.1, velocities.0, velocities.1
        );

        if holders.0 != holders.1 {
            warn!("{}: peers disagree on the holder", object);
            agree = false;
        }
        if velocities.0 != velocities.1 {
            warn!("{}: peers disagree on the release velocity", object);
            agree = false;
        }
    }

    let anchors = (
        owner.rig().anchor_position(hand.owner),
        observer.rig().anchor_position(hand.owner),
    );
    info!(
        "{} anchor: owner={:?} observer={:?}",
        hand.owner, anchors.0, anchors.1
    );
    match anchors {
        (Some(a), Some(b)) if (a - b).magnitude() < 1e-4 => {}
        _ => {
            warn!("peers disagree on the anchor of {}", hand.owner);
            agree = false;
        }
    }

    let teleporting = owner.hand(hand).map_or(false, |h| h.is_teleporting());
    if teleporting {
        info!("teleport still in progress at the last frame");
    }

    if !agree {
        bail!("observer diverged from owner");
    }
    info!("observer agrees with owner");
    Ok(())
}
