mod logging;
mod trace;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, ValueEnum};
use hidtouch::touch::usage::{
    self, AbsAxis, InputCapability, UsageMapping, HID_DG_CONFIDENCE, HID_DG_CONTACTID,
    HID_DG_INRANGE, HID_DG_TIPSWITCH, HID_GD_X, HID_GD_Y,
};
use hidtouch::{DeviceConfig, InputEvent, PenMountTouch, ProtocolMode};
use log::info;

use trace::TraceStep;

#[derive(Debug, Parser)]
#[command(name = "field_replay")]
#[command(about = "Replay captured PenMount field traces through the contact tracker")]
struct Cli {
    /// Trace file of `field,...` and `poll,...` records.
    trace: PathBuf,
    #[arg(long, default_value_t = 2)]
    max_contacts: u8,
    #[arg(long, value_enum, default_value_t = Protocol::B)]
    protocol: Protocol,
    #[arg(long, default_value_t = 100)]
    frame_timeout_ms: u64,
    /// Disable the forced-flush timer.
    #[arg(long)]
    no_timeout: bool,
    /// Poll once this long after the last record so stalled frames flush.
    #[arg(long, default_value_t = 200)]
    tail_ms: u64,
    /// Expected event lines; the replay fails on any mismatch.
    #[arg(long)]
    expect: Option<PathBuf>,
    /// Print the input capabilities the device declares before replaying.
    #[arg(long)]
    capabilities: bool,
    /// Logical maximum of the X/Y usages, for `--capabilities`.
    #[arg(long, default_value_t = 4095)]
    logical_max: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Protocol {
    /// Anonymous contacts.
    A,
    /// Persistent slots.
    B,
}

impl From<Protocol> for ProtocolMode {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::A => ProtocolMode::AnonymousContact,
            Protocol::B => ProtocolMode::PersistentSlot,
        }
    }
}

fn main() {
    logging::init_from_env();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = DeviceConfig {
        max_contacts: cli.max_contacts,
        protocol: cli.protocol.into(),
        frame_timeout_ms: (!cli.no_timeout).then_some(cli.frame_timeout_ms),
    };
    if cli.capabilities {
        for line in capability_lines(&config, cli.logical_max) {
            println!("capability,{line}");
        }
    }

    let steps = trace::read_trace(&cli.trace)?;
    let events = replay(config, &steps, cli.tail_ms)?;

    let lines: Vec<String> = events.iter().map(trace::event_line).collect();
    for line in &lines {
        println!("event,{line}");
    }

    if let Some(expect_path) = cli.expect {
        let expected = trace::read_expected(&expect_path)?;
        if lines != expected {
            eprintln!("expected: {}", expected.join(" "));
            eprintln!("actual:   {}", lines.join(" "));
            bail!("event sequence mismatch");
        }
    }

    Ok(())
}

fn replay(config: DeviceConfig, steps: &[TraceStep], tail_ms: u64) -> Result<Vec<InputEvent>> {
    let mut engine =
        PenMountTouch::attach(config).map_err(|err| anyhow!("cannot attach device: {err}"))?;
    let mut events: Vec<InputEvent> = Vec::new();
    let mut sink = |event: InputEvent| events.push(event);

    for step in steps {
        match *step {
            TraceStep::Field { ms, kind, value } => {
                let disposition = engine.handle_field(ms, kind, value, &mut sink);
                if !disposition.is_consumed() {
                    info!("field {:?} at {} ms left to generic handling", kind, ms);
                }
            }
            TraceStep::Poll { ms } => engine.poll(ms, &mut sink),
        }
    }

    if let Some(last_ms) = steps.last().map(TraceStep::ms) {
        engine.poll(last_ms.saturating_add(tail_ms), &mut sink);
    }

    let counters = engine.counters();
    info!(
        "frames={} wrap_flushes={} timeout_flushes={} stale_releases={} ignored_ids={} unhandled={} dropped={}",
        counters.frames_completed,
        counters.wrap_flushes,
        counters.timeout_flushes,
        counters.stale_releases,
        counters.ignored_contact_ids,
        counters.unhandled_fields,
        counters.dropped_events
    );

    Ok(events)
}

fn capability_lines(config: &DeviceConfig, logical_max: i32) -> Vec<String> {
    let contact_max = i32::from(config.max_contacts.saturating_sub(1));
    [
        (HID_GD_X, 0, logical_max),
        (HID_GD_Y, 0, logical_max),
        (HID_DG_TIPSWITCH, 0, 1),
        (HID_DG_CONTACTID, 0, contact_max),
        (HID_DG_INRANGE, 0, 1),
        (HID_DG_CONFIDENCE, 0, 1),
    ]
    .into_iter()
    .map(|(code, min, max)| {
        format!(
            "{code:#010x},{}",
            mapping_label(usage::map_usage(config, code, min, max))
        )
    })
    .collect()
}

fn mapping_label(mapping: UsageMapping) -> String {
    match mapping {
        UsageMapping::Mapped {
            capability,
            legacy: Some(legacy),
        } => format!(
            "mapped,{},legacy,{}",
            capability_label(capability),
            capability_label(legacy)
        ),
        UsageMapping::Mapped {
            capability,
            legacy: None,
        } => format!("mapped,{}", capability_label(capability)),
        UsageMapping::Ignored { setup: Some(setup) } => {
            format!("ignored,{}", capability_label(setup))
        }
        UsageMapping::Ignored { setup: None } => "ignored".to_string(),
        UsageMapping::Generic => "generic".to_string(),
    }
}

fn capability_label(capability: InputCapability) -> String {
    match capability {
        InputCapability::TouchKey => "touch_key".to_string(),
        InputCapability::Abs { axis, min, max } => {
            let axis = match axis {
                AbsAxis::X => "abs_x",
                AbsAxis::Y => "abs_y",
                AbsAxis::MtPositionX => "mt_position_x",
                AbsAxis::MtPositionY => "mt_position_y",
                AbsAxis::MtTouchMajor => "mt_touch_major",
            };
            format!("{axis}:{min}..{max}")
        }
        InputCapability::Slots { count } => format!("slots:{count}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay_str(config: DeviceConfig, raw: &str) -> Vec<String> {
        let steps = trace::parse_trace(raw).expect("valid trace");
        replay(config, &steps, 200)
            .expect("replay")
            .iter()
            .map(trace::event_line)
            .collect()
    }

    #[test]
    fn bundled_traces_match_expectations() {
        let fixtures = [
            ("single_touch", DeviceConfig::single_touch()),
            (
                "two_finger_slots",
                DeviceConfig::multi_touch(ProtocolMode::PersistentSlot),
            ),
            (
                "two_finger_anonymous",
                DeviceConfig::multi_touch(ProtocolMode::AnonymousContact),
            ),
            (
                "dropped_contact",
                DeviceConfig::multi_touch(ProtocolMode::PersistentSlot),
            ),
        ];
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("traces");
        for (name, config) in fixtures {
            let steps = trace::read_trace(&dir.join(format!("{name}.csv"))).expect("trace");
            let expected =
                trace::read_expected(&dir.join(format!("{name}.expected"))).expect("expected");
            let actual: Vec<String> = replay(config, &steps, 200)
                .expect("replay")
                .iter()
                .map(trace::event_line)
                .collect();
            assert_eq!(actual, expected, "fixture {name}");
        }
    }

    #[test]
    fn tail_poll_flushes_stalled_frame() {
        let config = DeviceConfig::multi_touch(ProtocolMode::PersistentSlot);
        let trace = "field,0,contact_id,0\nfield,0,touch,1\nfield,0,x,1\nfield,0,y,1\n\
                     field,0,contact_id,1\nfield,0,touch,1\nfield,0,x,2\nfield,0,y,2\n";
        let without_timeout = replay_str(config.with_frame_timeout(None), trace);
        let with_timeout = replay_str(config, trace);

        assert!(!without_timeout.iter().any(|line| line.starts_with("tracking_id,1")));
        assert!(with_timeout.contains(&"tracking_id,1,1".to_string()));
        assert_eq!(with_timeout.last().map(String::as_str), Some("sync"));
    }

    #[test]
    fn invalid_contact_count_is_reported() {
        let config = DeviceConfig {
            max_contacts: 4,
            ..DeviceConfig::single_touch()
        };
        let err = replay(config, &[], 0).expect_err("rejected");
        assert!(format!("{err}").contains("cannot attach device"));
    }

    #[test]
    fn capabilities_follow_device_config() {
        let slots =
            capability_lines(&DeviceConfig::multi_touch(ProtocolMode::PersistentSlot), 4095);
        assert_eq!(
            slots,
            vec![
                "0x00010030,mapped,mt_position_x:0..4095,legacy,abs_x:0..4095",
                "0x00010031,mapped,mt_position_y:0..4095,legacy,abs_y:0..4095",
                "0x000d0042,mapped,touch_key",
                "0x000d0051,ignored,slots:2",
                "0x000d0032,ignored",
                "0x000d0047,ignored",
            ]
        );

        let anonymous =
            capability_lines(&DeviceConfig::multi_touch(ProtocolMode::AnonymousContact), 4095);
        assert_eq!(anonymous[3], "0x000d0051,ignored,mt_touch_major:0..5");

        let single = capability_lines(&DeviceConfig::single_touch(), 2047);
        assert_eq!(single[0], "0x00010030,mapped,abs_x:0..2047");
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["field_replay", "trace.csv"]).expect("parse");
        assert_eq!(cli.max_contacts, 2);
        assert_eq!(cli.protocol, Protocol::B);
        assert_eq!(cli.frame_timeout_ms, 100);
        assert!(!cli.no_timeout);
        assert!(cli.expect.is_none());
        assert!(!cli.capabilities);

        let cli = Cli::try_parse_from(["field_replay", "t.csv", "--protocol", "a", "--no-timeout"])
            .expect("parse");
        assert_eq!(ProtocolMode::from(cli.protocol), ProtocolMode::AnonymousContact);
        assert!(cli.no_timeout);
    }
}
