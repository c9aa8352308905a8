use std::io::{Cursor, Read, Seek, SeekFrom};

use super::*;
use crate::parameters::ParameterFile;

fn linear_phase_table(steps: usize) -> String {
    let half = (steps / 2) as f64;
    (0..steps)
        .map(|i| format!("{:.6}", (i as f64 - half) / half))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 2D multi-slice acquisition without a protocol document
fn flash_acqp() -> ParameterFile {
    let text = format!(
        "##TITLE=Parameter List
##$ACQ_dim=2
##$ACQ_size=( 2 )
256 128
##$NI=3
##$ACQ_obj_order=( 3 )
2 0 1
##$NSLICES=3
##$ACQ_n_echo_images=1
##$ACQ_phase_factor=1
##$ACQ_rare_factor=1
##$NR=2
##$ACQ_spatial_size_1=128
##$ACQ_spatial_phase_1=( 128 )
{}
##$GO_block_size=continuous
##$GO_raw_data_format=GO_32BIT_SGN_INT
##$BYTORDA=little
##END=
",
        linear_phase_table(128)
    );
    ParameterFile::parse(&text).unwrap()
}

/// 3D two-channel acquisition with segmented phase encoding
fn rare_3d() -> (ParameterFile, ParameterFile) {
    let acqp = ParameterFile::parse(
        "##$ACQ_dim=3
##$ACQ_size=( 3 )
64 4 2
##$NI=1
##$ACQ_obj_order=( 1 )
0
##$NSLICES=1
##$ACQ_n_echo_images=2
##$ACQ_phase_factor=2
##$ACQ_rare_factor=2
##$NR=1
##$GO_block_size=Standard_KBlock_Format
##$GO_raw_data_format=GO_16BIT_SGN_INT
",
    )
    .unwrap();
    let method = ParameterFile::parse(
        "##$PVM_EncAvailReceivers=2
##$PVM_Matrix=( 3 )
32 4 2
##$PVM_AntiAlias=( 3 )
2 1 1
##$PVM_EncSteps1=( 4 )
-2 -1 0 1
##$PVM_EncSteps2=( 2 )
-1 0
",
    )
    .unwrap();
    (acqp, method)
}

fn record(format: DataFormat, profile_length: usize, position: u64) -> RawProfile {
    let mut profile = RawProfile::with_layout(profile_length, 1, format);
    profile.file_position = position;
    profile
}

#[test]
fn test_multislice_acquisition_order() {
    let acqp = flash_acqp();
    let mut generator = ProfileListGenerator::new();
    let profiles = generator.generate(&acqp, None).unwrap();

    assert_eq!(profiles.len(), 2 * 128 * 3);
    assert_eq!(generator.profile_data_length().unwrap(), 4 * 256);

    let slices: Vec<usize> = profiles.iter().take(6).map(|p| p.slice_no).collect();
    assert_eq!(slices, vec![2, 0, 1, 2, 0, 1]);

    for repetition in profiles.iter().collect::<Vec<_>>().chunks(384) {
        let ky: Vec<i32> = repetition.iter().step_by(3).map(|p| p.encode_step_1).collect();
        assert_eq!(ky.len(), 128);
        assert!(ky.windows(2).all(|w| w[0] < w[1]), "ky not monotonic");
        assert_eq!(ky[0], generator.encoding_step_1_min());
        assert_eq!(ky[127], generator.encoding_step_1_max());
    }
    assert!(generator.encoding_step_1_min() < 0);
    assert!(generator.encoding_step_1_max() > 0);

    let offsets: Vec<u64> = profiles.iter().map(|p| p.file_position).collect();
    assert_eq!(offsets[0], 0);
    assert!(offsets.windows(2).all(|w| w[1] - w[0] == 1024));

    let last = profiles.last().unwrap();
    assert_eq!(last.repetition_no, 1);
    assert_eq!(last.profile_length, 128);
    assert_eq!(last.data_format, DataFormat::Int32);
    assert_eq!(last.encode_step_2, 0);
    assert_eq!(generator.channel_count(), 1);
    assert_eq!(generator.dimension_size(0), 128);
    assert_eq!(generator.dimension_size(1), 128);
    assert_eq!(generator.dimension_size(2), 0);
}

#[test]
fn test_block_padding() {
    assert_eq!(padded_profile_length(2050, true), Some(3072));
    assert_eq!(padded_profile_length(2048, true), Some(2048));
    assert_eq!(padded_profile_length(2050, false), Some(2050));
    assert_eq!(padded_profile_length(0, true), Some(0));
    assert_eq!(padded_profile_length(usize::MAX - 10, true), None);
    assert_eq!(padded_profile_length(usize::MAX - 10, false), Some(usize::MAX - 10));
}

fn single_readout_acqp(readout: &str, repetitions: usize, block_size: &str) -> ParameterFile {
    let text = format!(
        "##$ACQ_dim=1
##$ACQ_size=( 1 )
{}
##$NI=1
##$ACQ_obj_order=( 1 )
0
##$NSLICES=1
##$ACQ_n_echo_images=1
##$ACQ_phase_factor=1
##$NR={}
##$GO_block_size={}
##$GO_raw_data_format=GO_32BIT_SGN_INT
",
        readout, repetitions, block_size
    );
    ParameterFile::parse(&text).unwrap()
}

#[test]
fn test_oversized_readout_is_rejected() {
    let acqp = single_readout_acqp("4611686018427387904", 1, "continuous");
    let err = ProfileListGenerator::new().generate(&acqp, None).unwrap_err();
    assert!(matches!(err, RawDataError::InvalidParameter { ref name, .. } if name == "ACQ_size"));

    // Fits before padding, overflows when rounded up to a block
    let near_limit = (usize::MAX / 4 - 2).to_string();
    let acqp = single_readout_acqp(&near_limit, 1, "Standard_KBlock_Format");
    let err = ProfileListGenerator::new().generate(&acqp, None).unwrap_err();
    assert!(matches!(err, RawDataError::InvalidParameter { ref name, .. } if name == "ACQ_size"));
}

#[test]
fn test_file_offsets_must_fit() {
    // Each record fits, three of them overrun a u64 offset
    let readout = (u64::MAX / 8).to_string();
    let acqp = single_readout_acqp(&readout, 3, "continuous");
    let err = ProfileListGenerator::new().generate(&acqp, None).unwrap_err();
    assert!(matches!(err, RawDataError::InvalidParameter { ref name, .. } if name == "ACQ_size"));
}

#[test]
fn test_record_sizes_are_checked() {
    assert_eq!(raw_record_length(DataFormat::Int16, 64, 2).unwrap(), 256);
    assert_eq!(record_stride(DataFormat::Int16, 64, 2, true).unwrap(), 1024);
    assert!(raw_record_length(DataFormat::Float32, usize::MAX / 2, 1).is_err());

    let profile = RawProfile::with_layout(usize::MAX / 2, 2, DataFormat::Int32);
    assert!(matches!(
        profile.value_count(),
        Err(RawDataError::AllocationFailure { .. })
    ));
    let mut buffer = Cursor::new(vec![0u8; 16]);
    let mut profile = profile;
    assert!(profile.read(&mut buffer).is_err());
}

#[test]
fn test_encode_step_out_of_range() {
    let (acqp, _) = rare_3d();
    let method = ParameterFile::parse(
        "##$PVM_EncSteps1=( 4 )
-2 -1 0 4294967296
",
    )
    .unwrap();
    let err = ProfileListGenerator::new()
        .generate(&acqp, Some(&method))
        .unwrap_err();
    assert!(matches!(err, RawDataError::InvalidParameter { ref name, .. } if name == "PVM_EncSteps1"));
}

#[test]
fn test_protocol_tables_and_3d_loops() {
    let (acqp, method) = rare_3d();
    let mut generator = ProfileListGenerator::new();
    let profiles = generator.generate(&acqp, Some(&method)).unwrap();

    // 1 rep x 2 kz x (4 / 2) blocks x 1 slice x 2 phases x 2 echoes
    assert_eq!(profiles.len(), 16);
    assert_eq!(generator.channel_count(), 2);
    assert_eq!(generator.dimension_size(0), 64);
    assert_eq!(generator.dimension_size(1), 4);
    assert_eq!(generator.rare_factor(), 2);
    // 2 bytes x 64 values x 2 channels, padded to one block
    assert_eq!(generator.profile_data_length().unwrap(), 1024);

    let ky: Vec<i32> = profiles.iter().take(8).map(|p| p.encode_step_1).collect();
    assert_eq!(ky, vec![-2, -2, -1, -1, 0, 0, 1, 1]);
    let echoes: Vec<usize> = profiles.iter().take(4).map(|p| p.echo_no).collect();
    assert_eq!(echoes, vec![0, 1, 0, 1]);
    assert!(profiles.iter().take(8).all(|p| p.encode_step_2 == -1));
    assert!(profiles.iter().skip(8).all(|p| p.encode_step_2 == 0));
    assert_eq!(generator.encoding_step_2_min(), -1);
    assert_eq!(generator.encoding_step_2_max(), 0);

    let first = profiles.first().unwrap();
    assert_eq!(first.channel_count, 2);
    assert_eq!(first.value_count().unwrap(), 128);
    assert_eq!(profiles.get(15).unwrap().file_position, 15 * 1024);
}

#[test]
fn test_short_encode_table() {
    let (acqp, _) = rare_3d();
    let method = ParameterFile::parse("##$PVM_EncSteps1=( 2 )\n0 1\n").unwrap();
    let err = ProfileListGenerator::new()
        .generate(&acqp, Some(&method))
        .unwrap_err();
    assert!(matches!(
        err,
        RawDataError::DimensionMismatch { expected: 4, actual: 2, .. }
    ));
}

#[test]
fn test_missing_required_parameter() {
    let acqp = ParameterFile::parse(
        "##$ACQ_dim=1\n##$ACQ_size=( 1 )\n64\n##$NI=1\n##$ACQ_obj_order=( 1 )\n0\n\
         ##$NSLICES=1\n##$ACQ_n_echo_images=1\n##$ACQ_phase_factor=1\n",
    )
    .unwrap();
    let err = AcquisitionParameters::extract(&acqp, None).unwrap_err();
    assert!(matches!(err, RawDataError::MissingRequiredParameter(ref n) if n == "NR"));
}

#[test]
fn test_object_order_length_checked() {
    let acqp = ParameterFile::parse(
        "##$ACQ_dim=1\n##$ACQ_size=( 1 )\n64\n##$NI=3\n##$ACQ_obj_order=( 2 )\n0 1\n",
    )
    .unwrap();
    let err = AcquisitionParameters::extract(&acqp, None).unwrap_err();
    match err {
        RawDataError::DimensionMismatch {
            parameter,
            expected,
            actual,
        } => {
            assert_eq!(parameter, "ACQ_obj_order");
            assert_eq!(expected, 3);
            assert_eq!(actual, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_zero_phase_factor_rejected() {
    let acqp = ParameterFile::parse(
        "##$ACQ_dim=1\n##$ACQ_size=( 1 )\n64\n##$NI=1\n##$ACQ_obj_order=( 1 )\n0\n\
         ##$NSLICES=1\n##$ACQ_n_echo_images=1\n##$ACQ_phase_factor=0\n##$NR=1\n",
    )
    .unwrap();
    let err = AcquisitionParameters::extract(&acqp, None).unwrap_err();
    assert!(matches!(err, RawDataError::InvalidParameter { ref name, .. } if name == "ACQ_phase_factor"));
}

#[test]
fn test_unknown_format_maps_to_none() {
    assert_eq!(DataFormat::from_label("GO_64BIT_FLOAT"), DataFormat::None);
    assert_eq!(DataFormat::from_label("GO_32BIT_FLOAT"), DataFormat::Float32);
    assert_eq!(DataFormat::None.element_size(), 2);
    assert_eq!(DataFormat::Int32.element_size(), 4);
}

#[test]
fn test_flat_phase_table() {
    let order = EncodingOrder::from_phase_table(&[0.5, 0.5, 0.5], 64);
    assert_eq!(order.steps, vec![0, 0, 0]);
    assert_eq!((order.min, order.max), (0, 0));

    let order = EncodingOrder::from_phase_table(&[], 64);
    assert!(order.is_empty());
    assert_eq!((order.min, order.max), (0, 0));
}

#[test]
fn test_parameter_dump() {
    let (acqp, method) = rare_3d();
    let mut generator = ProfileListGenerator::new();
    generator.generate(&acqp, Some(&method)).unwrap();
    let dump = generator.to_string();
    assert!(dump.contains("ACQ_dim: 3"));
    assert!(dump.contains("ACQ_size[3]: 64 4 2"));
    assert!(dump.contains("ky_profile_order[4]: -2 -1 0 1"));
    assert!(dump.contains("block format: true"));
}

#[test]
fn test_float_round_trip_is_exact() {
    let samples = vec![1.5f32, -2.25, 1e-7, -3.4e38, 0.0, 42.0];
    let mut out = record(DataFormat::Float32, 3, 0);
    out.set_samples(&samples).unwrap();

    let mut file = Cursor::new(Vec::new());
    out.write(&mut file, 0.0).unwrap();
    assert_eq!(file.get_ref().len(), 24);

    let mut back = record(DataFormat::Float32, 3, 0);
    back.read(&mut file).unwrap();
    assert_eq!(back.samples().unwrap(), samples.as_slice());
}

#[test]
fn test_integer_write_keeps_headroom() {
    let samples = vec![1000.0f32, -1000.0, 250.5, -0.25, 999.9, 0.0];
    for format in [DataFormat::Int16, DataFormat::Int32] {
        let type_max = match format {
            DataFormat::Int16 => f64::from(i16::MAX),
            _ => f64::from(i32::MAX),
        };
        let mut out = record(format, 3, 0);
        out.set_samples(&samples).unwrap();
        let reference = out.max_data_value();
        assert_eq!(reference, 1000.0);

        let mut file = Cursor::new(Vec::new());
        out.write(&mut file, reference).unwrap();
        let mut back = record(format, 3, 0);
        back.read(&mut file).unwrap();

        let scale = type_max / (f64::from(reference) * 1.1);
        for (&original, &stored) in samples.iter().zip(back.samples().unwrap()) {
            let expected = scale * f64::from(original);
            // 32-bit values lose precision when widened to f32
            let tolerance = 0.5 + expected.abs() * f64::from(f32::EPSILON);
            assert!((f64::from(stored) - expected).abs() <= tolerance);
            assert!(f64::from(stored).abs() < type_max);
        }
    }
}

#[test]
fn test_negative_samples_round_to_nearest() {
    // with a reference of 1.1 the int16 scale is about i16::MAX / 1.21
    let mut out = record(DataFormat::Int16, 2, 0);
    let scale = f64::from(i16::MAX) / (1.1 * 1.1);
    let samples = [-2.2 / scale as f32, -2.7 / scale as f32, 1.1, 2.6 / scale as f32];
    out.set_samples(&samples).unwrap();
    let mut file = Cursor::new(Vec::new());
    out.write(&mut file, 1.1).unwrap();
    let mut back = record(DataFormat::Int16, 2, 0);
    back.read(&mut file).unwrap();
    assert_eq!(back.samples().unwrap()[..2], [-2.0, -3.0]);
    assert_eq!(back.samples().unwrap()[3], 3.0);
}

#[test]
fn test_zero_reference_writes_zeros() {
    let mut out = record(DataFormat::Int16, 2, 0);
    out.set_samples(&[5.0, -5.0, 3.0, 1.0]).unwrap();
    let mut file = Cursor::new(Vec::new());
    out.write(&mut file, 0.0).unwrap();
    assert!(file.get_ref().iter().all(|&b| b == 0));
}

#[test]
fn test_big_endian_decode() {
    let mut bytes = Vec::new();
    for v in [1i32, -2, 70000, -70000] {
        bytes.extend_from_slice(&v.to_be_bytes());
    }
    let mut profile = record(DataFormat::Int32, 2, 0);
    profile.endianness = Endianness::Big;
    profile.read(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(profile.samples().unwrap(), &[1.0, -2.0, 70000.0, -70000.0]);
}

#[test]
fn test_short_read_keeps_partial_samples() {
    // Two whole int16 samples and one stray byte
    let bytes = vec![1u8, 0, 2, 0, 9];
    let mut profile = record(DataFormat::Int16, 2, 0);
    let err = profile.read(&mut Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, RawDataError::ShortRead { expected: 8, actual: 5 }));
    assert_eq!(profile.samples().unwrap(), &[1.0, 2.0, 0.0, 0.0]);
}

#[test]
fn test_write_preconditions() {
    let mut file = Cursor::new(Vec::new());
    let profile = record(DataFormat::None, 2, 0);
    assert!(matches!(profile.write(&mut file, 1.0), Err(RawDataError::NoFormat)));
    let profile = record(DataFormat::Int16, 2, 0);
    assert!(matches!(profile.write(&mut file, 1.0), Err(RawDataError::NoData)));
}

#[test]
fn test_read_without_format_is_noop() {
    let mut profile = record(DataFormat::None, 2, 0);
    profile.read(&mut Cursor::new(Vec::new())).unwrap();
    assert!(!profile.has_samples());
}

#[test]
fn test_set_samples_length_checked() {
    let mut profile = record(DataFormat::Float32, 2, 0);
    let err = profile.set_samples(&[1.0, 2.0]).unwrap_err();
    assert!(matches!(err, RawDataError::SampleCountMismatch { expected: 4, actual: 2 }));
}

/// Cursor that counts explicit repositioning
struct SeekCounter {
    inner: Cursor<Vec<u8>>,
    seeks: usize,
}

impl Read for SeekCounter {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for SeekCounter {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        if pos != SeekFrom::Current(0) {
            self.seeks += 1;
        }
        self.inner.seek(pos)
    }
}

#[test]
fn test_sequential_reads_do_not_seek() {
    let bytes: Vec<u8> = (0..16i16).flat_map(|v| v.to_le_bytes()).collect();
    let mut stream = SeekCounter {
        inner: Cursor::new(bytes),
        seeks: 0,
    };
    let mut profiles: ProfileList = (0..4)
        .map(|i| record(DataFormat::Int16, 2, i * 8))
        .collect();
    for profile in profiles.iter_mut() {
        profile.read(&mut stream).unwrap();
    }
    assert_eq!(stream.seeks, 0);
    assert_eq!(profiles.get(3).unwrap().samples().unwrap(), &[12.0, 13.0, 14.0, 15.0]);

    // Reading out of order repositions
    profiles.get_mut(0).unwrap().read(&mut stream).unwrap();
    assert_eq!(stream.seeks, 1);
    assert_eq!(profiles.get(0).unwrap().samples().unwrap(), &[0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_max_data_value_uses_magnitude() {
    let mut profile = record(DataFormat::Float32, 2, 0);
    assert_eq!(profile.max_data_value(), 0.0);
    profile.set_samples(&[-7.0, -1.0, -3.0, -0.5]).unwrap();
    assert_eq!(profile.max_data_value(), 7.0);

    let mut other = record(DataFormat::Float32, 2, 8);
    other.set_samples(&[2.0, 9.5, 0.0, 0.0]).unwrap();
    let list: ProfileList = vec![profile, other].into_iter().collect();
    assert_eq!(list.max_data_value(), 9.5);
}

#[test]
fn test_complex_samples_pairs() {
    let mut profile = record(DataFormat::Float32, 2, 0);
    profile.set_samples(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    let pairs: Vec<(f32, f32)> = profile.complex_samples().unwrap().collect();
    assert_eq!(pairs, vec![(1.0, 2.0), (3.0, 4.0)]);
}

fn positions(list: &ProfileList) -> Vec<u64> {
    list.iter().map(|p| p.file_position).collect()
}

#[test]
fn test_list_splicing() {
    let mut list: ProfileList = (0..5).map(|i| record(DataFormat::Int16, 1, i)).collect();

    assert_eq!(list.delete_next(1).map(|p| p.file_position), Some(2));
    assert_eq!(positions(&list), vec![0, 1, 3, 4]);
    assert_eq!(list.delete_previous(1).map(|p| p.file_position), Some(0));
    assert_eq!(positions(&list), vec![1, 3, 4]);
    assert!(list.delete_previous(0).is_none());
    assert!(list.delete_next(2).is_none());
    assert_eq!(list.next(0).unwrap().file_position, 3);
    assert_eq!(list.previous(2).unwrap().file_position, 3);

    assert_eq!(list.delete_all_linked(1), 2);
    assert_eq!(positions(&list), vec![3]);
    assert_eq!(list.delete_all_linked(7), 0);
}

#[test]
fn test_sort_by_file_position() {
    let mut list: ProfileList = [4u64, 1, 3, 0, 2]
        .iter()
        .map(|&i| record(DataFormat::Int16, 1, i * 100))
        .collect();
    let head = list.sort_by_file_position().map(|p| p.file_position);
    assert_eq!(head, Some(0));
    assert_eq!(positions(&list), vec![0, 100, 200, 300, 400]);

    let mut empty = ProfileList::new();
    assert!(empty.sort_by_file_position().is_none());
}

#[test]
fn test_load_from_kspace() {
    // kx = 2 complex samples, ky = 4, kz = 1, 2 objects, 1 repetition
    let dims = [2, 4, 1, 2, 1];
    let data: Vec<f32> = (0..2 * 2 * 4 * 2).map(|v| v as f32).collect();
    let kspace = KSpaceArray::from_vec(dims, data).unwrap();

    let mut profile = record(DataFormat::Float32, 2, 0);
    profile.encode_step_1 = 1; // centred axis: ky_min = -2, row 3
    profile.object_no = 1;
    profile.load_from_kspace(&kspace, None, None).unwrap();
    // object 1 starts at 4 * 2 complex samples; row 3 adds 3 * 2
    let start = 2.0 * (8.0 + 6.0);
    assert_eq!(
        profile.samples().unwrap(),
        &[start, start + 1.0, start + 2.0, start + 3.0]
    );

    profile.encode_step_1 = 2;
    let err = profile.load_from_kspace(&kspace, None, None).unwrap_err();
    assert!(matches!(err, RawDataError::KSpaceBounds { axis: 1, index: 4, size: 4 }));

    profile.encode_step_1 = 0;
    profile.load_from_kspace(&kspace, Some(0), Some(0)).unwrap();
    assert_eq!(profile.samples().unwrap()[0], 16.0);
}

#[test]
fn test_kspace_size_checked() {
    let err = KSpaceArray::from_vec([2, 2, 1, 1, 1], vec![0.0; 3]).unwrap_err();
    assert!(matches!(err, RawDataError::SampleCountMismatch { expected: 8, actual: 3 }));
    let zeros = KSpaceArray::zeros([2, 2, 1, 1, 1]).unwrap();
    assert_eq!(zeros.data().len(), 8);
}
