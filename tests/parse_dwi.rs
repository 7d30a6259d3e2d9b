use pretty_assertions::assert_eq;
use simfile_rs::simfile::{
    Format,
    model::{HoldKind, Note, Quantization, RawSimfile, StepKind, Stepchart},
    parse::{ParseError, Tolerance},
};

fn parse(source: &str) -> RawSimfile {
    Format::Dwi
        .parse(source, Tolerance::Warn)
        .expect("fixture must parse")
}

fn tap_offsets(chart: &Stepchart) -> Vec<(usize, f64)> {
    chart
        .beats
        .iter()
        .flat_map(|beat| beat.steps.iter())
        .filter_map(|note| match note {
            Note::Step(step) if step.kind == StepKind::Tap => Some((step.column, step.offset)),
            _ => None,
        })
        .collect()
}

#[test]
fn pad_codes_become_column_steps() {
    let source = "
#TITLE:MAX 300;
#ARTIST:Naoki;
#BPM:300;
#SINGLE:MANIAC:10:88226688;
";
    let simfile = parse(source);

    assert_eq!(simfile.available_types.len(), 1);
    assert_eq!(simfile.available_types[0].slug, "single-expert");
    assert_eq!(simfile.available_types[0].feet, 10);

    let chart = &simfile.charts["single-expert"];
    assert_eq!(chart.bpm.len(), 1);
    assert_eq!(chart.bpm[0].bpm, 300.0);

    // eighth notes by default: up up down down right right up up
    assert_eq!(
        tap_offsets(chart),
        vec![
            (2, 0.0),
            (2, 0.5),
            (1, 1.0),
            (1, 1.5),
            (3, 2.0),
            (3, 2.5),
            (2, 3.0),
            (2, 3.5)
        ]
    );
}

#[test]
fn jumps_are_single_codes() {
    let source = "
#TITLE:JUMPY;
#BPM:150;
#SINGLE:BASIC:4:A0B0;
";
    let simfile = parse(source);
    let chart = &simfile.charts["single-basic"];

    // A = up-down, B = left-right
    assert_eq!(
        tap_offsets(chart),
        vec![(1, 0.0), (2, 0.0), (0, 1.0), (3, 1.0)]
    );
    assert_eq!(chart.beats.len(), 2);
    assert_eq!(chart.beats[0].steps.len(), 2);
}

#[test]
fn subdivision_escapes_change_the_increment() {
    let source = "
#TITLE:BURST;
#BPM:180;
#SINGLE:ANOTHER:7:8(8888)8;
";
    let simfile = parse(source);
    let chart = &simfile.charts["single-difficult"];

    let offsets: Vec<f64> = tap_offsets(chart).iter().map(|&(_, o)| o).collect();
    assert_eq!(offsets, vec![0.0, 0.5, 0.75, 1.0, 1.25, 1.5]);

    let quantizations: Vec<Quantization> = chart
        .beats
        .iter()
        .map(|beat| beat.steps[0].quantization())
        .collect();
    assert_eq!(
        quantizations,
        vec![
            Quantization::Fourth,
            Quantization::Eighth,
            Quantization::Sixteenth,
            Quantization::Fourth,
            Quantization::Sixteenth,
            Quantization::Eighth
        ]
    );
}

#[test]
fn triplet_and_ultra_fine_escapes_classify_or_fall_back() {
    let source = "
#TITLE:FINE;
#BPM:200;
#SINGLE:MANIAC:9:8[888]`88'8;
";
    let simfile = parse(source);
    let chart = &simfile.charts["single-expert"];

    let offsets: Vec<f64> = tap_offsets(chart).iter().map(|&(_, o)| o).collect();
    assert_eq!(offsets.len(), 7);
    assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));

    // 24th and 192nd positions have no bucket of their own and land in the
    // 64th catch-all
    let quantizations: Vec<Quantization> = chart
        .beats
        .iter()
        .map(|beat| beat.steps[0].quantization())
        .collect();
    assert_eq!(
        quantizations,
        vec![
            Quantization::Fourth,
            Quantization::Eighth,
            Quantization::Sixth,
            Quantization::SixtyFourth,
            Quantization::Fourth,
            Quantization::SixtyFourth,
            Quantization::SixtyFourth
        ]
    );
}

#[test]
fn freeze_compounds_open_and_close() {
    let source = "
#TITLE:HOLDER;
#BPM:120;
#SINGLE:MANIAC:9:B!602080B;
";
    let simfile = parse(source);
    let chart = &simfile.charts["single-expert"];

    let holds: Vec<_> = chart
        .beats
        .iter()
        .flat_map(|beat| beat.steps.iter())
        .filter_map(|note| match note {
            Note::Hold(hold) => Some(*hold),
            _ => None,
        })
        .collect();

    // B!6: the left-right chord starts, only right holds; the closing B
    // concludes it one beat past the hit
    assert_eq!(holds.len(), 1);
    assert_eq!(holds[0].kind, HoldKind::Freeze);
    assert_eq!(holds[0].column, 3);
    assert_eq!(holds[0].offset, 0.0);
    assert_eq!(holds[0].end_offset, 4.0);

    assert_eq!(
        tap_offsets(chart),
        vec![(0, 0.0), (1, 1.0), (2, 2.0), (0, 3.0)]
    );
}

#[test]
fn doubles_merge_both_pads_into_eight_columns() {
    let source = "
#TITLE:TWIN;
#BPM:140;
#DOUBLE:BASIC:6:2000:0800;
";
    let simfile = parse(source);
    let chart = &simfile.charts["double-basic"];

    assert_eq!(tap_offsets(chart), vec![(1, 0.0), (6, 0.5)]);
    for beat in &chart.beats {
        for note in &beat.steps {
            assert!(note.column() < 8);
        }
    }
}

#[test]
fn player_two_freezes_land_on_the_right_pad() {
    let source = "
#TITLE:TWIN HOLD;
#BPM:140;
#DOUBLE:TRICK:8:8!8008:2!2002;
";
    let simfile = parse(source);
    let chart = &simfile.charts["double-difficult"];

    let holds: Vec<_> = chart
        .beats
        .iter()
        .flat_map(|beat| beat.steps.iter())
        .filter_map(|note| match note {
            Note::Hold(hold) => Some(*hold),
            _ => None,
        })
        .collect();

    assert_eq!(holds.len(), 2);
    // p1 up stays on columns 0..4, p2 down shifts onto 4..8
    assert_eq!(holds[0].column, 2);
    assert_eq!(holds[1].column, 5);
    for hold in holds {
        assert!(hold.end_offset > hold.offset);
    }
}

#[test]
fn leading_empty_measures_rebase_timing() {
    let source = "
#TITLE:LATE START;
#BPM:175;
#CHANGEBPM:16=350;
#FREEZE:20=500;
#SINGLE:BASIC:5:0000000088226688;
";
    let simfile = parse(source);
    let chart = &simfile.charts["single-basic"];

    // one empty measure of eight eighths was skipped
    assert_eq!(tap_offsets(chart)[0], (2, 0.0));
    assert_eq!(chart.bpm[0].bpm, 175.0);
    assert_eq!(chart.bpm[0].end_offset, Some(0.0));
    assert_eq!(chart.bpm[1].bpm, 350.0);
    // changebpm positions are quarter beats, rebased by half a beat per
    // skipped character
    assert_eq!(chart.bpm[1].start_offset, 0.0);
    assert_eq!(chart.stops.len(), 1);
    assert_eq!(chart.stops[0].offset, 1.0);
    assert_eq!(chart.stops[0].duration, 500.0);
}

#[test]
fn display_bpm_range_uses_double_dots() {
    let source = "
#TITLE:RANGE;
#BPM:120;
#DISPLAYBPM:120..140;
#SINGLE:BASIC:3:8888;
";
    let simfile = parse(source);
    assert_eq!(simfile.display_bpm.as_deref(), Some("120-140"));
}

#[test]
fn display_bpm_number_passes_through() {
    let source = "
#TITLE:PLAIN;
#BPM:120;
#DISPLAYBPM:240;
#SINGLE:BASIC:3:8888;
";
    let simfile = parse(source);
    assert_eq!(simfile.display_bpm.as_deref(), Some("240"));
}

#[test]
fn missing_bpm_is_fatal() {
    let source = "
#TITLE:NO TEMPO;
#SINGLE:BASIC:3:8888;
";
    let err = Format::Dwi.parse(source, Tolerance::Warn).unwrap_err();
    let ParseError::Simfile { source: inner, .. } = err else {
        panic!("expected wrapped error, got {err:?}");
    };
    assert!(matches!(*inner, ParseError::MissingBpms));
}
