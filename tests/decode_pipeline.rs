use ndarray::{Array2, s};
use nilhmm_rs::hmm::{LogModel, viterbi_log};
use nilhmm_rs::{
    CallStatistics, DataProfile, DecodeOptions, Marker, MarkerIndex, NilHmmError,
    ObservationMatrix, ParameterSet, build_model, decode, decode_with, summarize, viterbi,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn approx_eq(a: f64, b: f64, eps: f64) {
    assert!(
        (a - b).abs() <= eps,
        "expected {a} ~= {b} within eps={eps}, got diff={}",
        (a - b).abs()
    );
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_calls(rng: &mut SmallRng, n_samples: usize, n_markers: usize) -> Array2<u8> {
    Array2::from_shape_fn((n_samples, n_markers), |_| rng.gen_range(0u8..4))
}

fn two_chromosome_index(len_a: usize, len_b: usize) -> MarkerIndex {
    (0..len_a)
        .map(|i| Marker::new("1", 1_000 + 10 * i as u64))
        .chain((0..len_b).map(|i| Marker::new("2", 500 + 3 * i as u64)))
        .collect()
}

#[test]
fn chromosomes_decode_independently_and_concatenate_in_order() {
    init_logging();
    let mut rng = SmallRng::seed_from_u64(42);
    let calls = random_calls(&mut rng, 6, 150);
    let obs = ObservationMatrix::new(calls.clone()).unwrap();
    let idx = two_chromosome_index(100, 50);
    let model = build_model(&ParameterSet::default()).unwrap();

    let out = decode(&obs, &idx, &model).expect("decode failed");
    assert_eq!(out.calls.shape(), &[6, 150]);
    assert_eq!(out.segments.len(), 2);

    for sample in 0..6 {
        let row = out.calls.row(sample);
        assert_eq!(row.len(), 150);
        let a: Vec<u8> = calls.slice(s![sample, ..100]).to_vec();
        let b: Vec<u8> = calls.slice(s![sample, 100..]).to_vec();
        let path_a = viterbi(&model, &a).unwrap();
        let path_b = viterbi(&model, &b).unwrap();
        assert_eq!(row.slice(s![..100]).to_vec(), path_a);
        assert_eq!(row.slice(s![100..]).to_vec(), path_b);
        assert!(row.iter().all(|&v| v <= 2));
    }
}

#[test]
fn state_does_not_carry_across_chromosome_boundary() {
    let calls = Array2::from_shape_vec((1, 7), vec![2, 2, 2, 2, 2, 2, 3]).unwrap();
    let obs = ObservationMatrix::new(calls).unwrap();
    let idx: MarkerIndex = (0..6)
        .map(|i| Marker::new("1", i as u64 + 1))
        .chain(std::iter::once(Marker::new("2", 1)))
        .collect();
    let model = build_model(&ParameterSet::default()).unwrap();

    let out = decode(&obs, &idx, &model).unwrap();
    // A missing call on a fresh chromosome falls back to the stationary prior.
    assert_eq!(out.calls.row(0).to_vec(), vec![2, 2, 2, 2, 2, 2, 0]);

    // Within one chromosome the donor run would have continued.
    let joined = viterbi(&model, &[2, 2, 2, 2, 2, 2, 3]).unwrap();
    assert_eq!(joined, vec![2; 7]);
}

#[test]
fn end_to_end_single_chromosome_golden() {
    let params = ParameterSet::new(0.01, 0.05, 0.10, 0.5, 0.15, 0.01, 0.25, 0.05).unwrap();
    let model = build_model(&params).unwrap();
    let obs = ObservationMatrix::from_rows(&[vec![0, 0, 0, 1, 0]]).unwrap();
    let idx: MarkerIndex = (1..=5).map(|p| Marker::new("1", p * 100)).collect();

    let out = decode(&obs, &idx, &model).unwrap();
    assert_eq!(out.calls.row(0).to_vec(), vec![0, 0, 0, 0, 0]);
    assert_eq!(out.summaries.len(), 1);
    assert_eq!(out.summaries[0].total_markers, 5);
    assert_eq!(out.summaries[0].counts, [5, 0, 0]);
    approx_eq(out.summaries[0].fraction(0), 1.0, 0.0);
}

#[test]
fn columns_are_reassembled_by_index_not_by_segment_order() {
    let rows = vec![vec![2, 2, 2, 0, 0, 0, 0, 1, 1, 1, 1, 1]];
    let obs = ObservationMatrix::from_rows(&rows).unwrap();
    let idx: MarkerIndex = [("1", 3), ("2", 4), ("3", 5)]
        .iter()
        .flat_map(|&(c, n)| (0..n).map(move |i| Marker::new(c, i as u64)))
        .collect();
    let model = build_model(&ParameterSet::default()).unwrap();
    let lm = LogModel::new(&model);

    let out = decode(&obs, &idx, &model).unwrap();
    let expected: Vec<u8> = [&rows[0][0..3], &rows[0][3..7], &rows[0][7..12]]
        .iter()
        .flat_map(|chunk| viterbi_log(&lm, chunk.to_vec()))
        .collect();
    assert_eq!(out.calls.row(0).to_vec(), expected);
    assert_eq!(expected, vec![2, 2, 2, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
}

#[test]
fn dedicated_pool_matches_global_pool() {
    let mut rng = SmallRng::seed_from_u64(2024);
    let obs = ObservationMatrix::new(random_calls(&mut rng, 12, 90)).unwrap();
    let idx: MarkerIndex = (0..90)
        .map(|i| Marker::new(format!("{}", i / 30 + 1), (i % 30) as u64))
        .collect();
    let model = build_model(&ParameterSet::preset(nilhmm_rs::Coverage::Medium)).unwrap();

    let global = decode(&obs, &idx, &model).unwrap();
    let pooled = decode_with(
        &obs,
        &idx,
        &model,
        &DecodeOptions {
            threads: Some(3),
            progress: false,
        },
    )
    .unwrap();
    assert_eq!(global.calls, pooled.calls);
    assert_eq!(global.summaries, pooled.summaries);
}

#[test]
fn zero_threads_is_rejected() {
    let obs = ObservationMatrix::from_rows(&[vec![0, 1]]).unwrap();
    let idx: MarkerIndex = (0..2).map(|i| Marker::new("1", i)).collect();
    let model = build_model(&ParameterSet::default()).unwrap();
    let err = decode_with(
        &obs,
        &idx,
        &model,
        &DecodeOptions {
            threads: Some(0),
            progress: false,
        },
    )
    .expect_err("expected thread count error");
    assert!(matches!(err, NilHmmError::ThreadPool(_)));
}

#[test]
fn marker_count_must_match_columns() {
    let obs = ObservationMatrix::from_rows(&[vec![0, 1, 2]]).unwrap();
    let idx: MarkerIndex = (0..2).map(|i| Marker::new("1", i)).collect();
    let model = build_model(&ParameterSet::default()).unwrap();
    let err = decode(&obs, &idx, &model).expect_err("expected shape mismatch");
    assert!(matches!(err, NilHmmError::ShapeMismatch(_)));
}

#[test]
fn unsorted_markers_fail_the_whole_decode() {
    let obs = ObservationMatrix::from_rows(&[vec![0, 0], vec![1, 1]]).unwrap();
    let idx = MarkerIndex::new(vec![Marker::new("1", 100), Marker::new("1", 50)]);
    let model = build_model(&ParameterSet::default()).unwrap();
    let err = decode(&obs, &idx, &model).expect_err("expected unsorted marker error");
    assert!(matches!(err, NilHmmError::UnsortedMarker { .. }));
}

#[test]
fn observation_matrix_rejects_unknown_symbols() {
    let calls = Array2::from_shape_vec((2, 2), vec![0, 1, 4, 3]).unwrap();
    let err = ObservationMatrix::new(calls).expect_err("expected invalid observation");
    assert_eq!(
        err,
        NilHmmError::InvalidObservation {
            sample: 1,
            marker: 0,
            value: 4,
        }
    );

    let err = ObservationMatrix::from_rows(&[vec![0, 1], vec![0]]).expect_err("ragged rows");
    assert!(matches!(err, NilHmmError::ShapeMismatch(_)));
}

#[test]
fn empty_matrix_decodes_to_empty_output() {
    let obs = ObservationMatrix::from_rows(&[]).unwrap();
    let model = build_model(&ParameterSet::default()).unwrap();
    let out = decode(&obs, &MarkerIndex::default(), &model).unwrap();
    assert_eq!(out.calls.shape(), &[0, 0]);
    assert!(out.summaries.is_empty());
}

#[test]
fn summaries_and_statistics_match_hand_counts() {
    let calls = Array2::from_shape_vec((2, 4), vec![0, 0, 0, 0, 0, 1, 2, 2]).unwrap();
    let records = summarize(&calls);
    assert_eq!(records[0].counts, [4, 0, 0]);
    assert_eq!(records[1].counts, [1, 1, 2]);
    assert_eq!(records[1].sample, 1);
    approx_eq(records[1].fraction(2), 0.5, 1e-12);

    let stats = CallStatistics::from_calls(&calls);
    approx_eq(stats.pct_recurrent_calls, 62.5, 1e-9);
    approx_eq(stats.pct_het_calls, 12.5, 1e-9);
    approx_eq(stats.pct_donor_calls, 25.0, 1e-9);
    approx_eq(stats.mean_het_rate, 0.125, 1e-12);
    approx_eq(stats.std_het_rate, 0.125, 1e-12);
    approx_eq(stats.mean_donor_rate, 0.25, 1e-12);
    approx_eq(stats.std_donor_rate, 0.25, 1e-12);
    approx_eq(stats.pct_samples_no_introgression, 50.0, 1e-9);
}

#[test]
fn data_profile_estimates_missing_rate_and_nir() {
    let obs = ObservationMatrix::from_rows(&[vec![0, 1, 3], vec![2, 1, 0]]).unwrap();

    let profile = DataProfile::estimate(&obs, 0.5).unwrap();
    approx_eq(profile.missing_rate, 1.0 / 6.0, 1e-12);
    approx_eq(profile.observed_maf, 1.0 / 3.0, 1e-12);
    approx_eq(profile.estimated_nir, 1.0 / 3.0, 1e-12);

    // Observed frequency above expectation clamps to the floor.
    let profile = DataProfile::estimate(&obs, 0.0156).unwrap();
    approx_eq(profile.estimated_nir, 0.001, 0.0);

    assert!(DataProfile::estimate(&obs, 0.0).is_err());
}
