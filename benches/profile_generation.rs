use bruker2mrd::parameters::ParameterFile;
use bruker2mrd::raw::{DataFormat, ProfileListGenerator, RawProfile};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Cursor;

/// Build an acqp document for a multi-slice 2D scan with `repetitions` repetitions
fn synthetic_acqp(readout: usize, lines: usize, slices: usize, repetitions: usize) -> String {
    let order: Vec<String> = (0..slices).map(|s| ((s * 2) % slices).to_string()).collect();
    let phase: Vec<String> = (0..lines)
        .map(|l| format!("{:.6}", l as f64 / lines as f64 - 0.5))
        .collect();
    let mut text = String::from("##TITLE=Parameter List, ParaVision 6.0.1\n##JCAMPDX=4.24\n");
    text.push_str("##$ACQ_dim=2\n");
    text.push_str(&format!("##$ACQ_size=( 2 )\n{} {}\n", readout, lines));
    text.push_str(&format!("##$NI={}\n##$NSLICES={}\n", slices, slices));
    text.push_str(&format!("##$ACQ_obj_order=( {} )\n{}\n", slices, order.join(" ")));
    text.push_str("##$ACQ_n_echo_images=1\n##$ACQ_phase_factor=1\n");
    text.push_str(&format!("##$NR={}\n", repetitions));
    text.push_str(&format!(
        "##$ACQ_spatial_size_1={}\n##$ACQ_spatial_phase_1=( {} )\n{}\n",
        lines,
        lines,
        phase.join(" ")
    ));
    text.push_str("##$GO_block_size=Standard_KBlock_Format\n");
    text.push_str("##$GO_raw_data_format=GO_32BIT_SGN_INT\n##$BYTORDA=little\n##END=\n");
    text
}

/// Benchmark parsing an acqp document
fn bench_parameter_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parameter_parsing");

    for lines in [64, 256, 1024] {
        let text = synthetic_acqp(256, lines, 8, 1);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &text, |b, text| {
            b.iter(|| {
                let document = ParameterFile::parse(black_box(text)).unwrap();
                black_box(document);
            });
        });
    }

    group.finish();
}

/// Benchmark generating the record list
fn bench_profile_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("profile_generation");

    for repetitions in [1, 10, 100] {
        let acqp = ParameterFile::parse(&synthetic_acqp(256, 128, 8, repetitions)).unwrap();
        group.throughput(Throughput::Elements((128 * 8 * repetitions) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}reps", repetitions)),
            &acqp,
            |b, acqp| {
                b.iter(|| {
                    let profiles = ProfileListGenerator::new()
                        .generate(black_box(acqp), None)
                        .unwrap();
                    black_box(profiles);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark decoding and re-encoding one record
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for format in [DataFormat::Int16, DataFormat::Int32, DataFormat::Float32] {
        let mut profile = RawProfile::with_layout(512, 4, format);
        let bytes = vec![0x11u8; profile.byte_length().unwrap()];
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("read", format.label()), &bytes, |b, bytes| {
            b.iter(|| {
                profile.read(&mut Cursor::new(black_box(bytes))).unwrap();
            });
        });

        profile.read(&mut Cursor::new(&bytes)).unwrap();
        let reference = profile.max_data_value();
        group.bench_function(BenchmarkId::new("write", format.label()), |b| {
            b.iter(|| {
                let mut out = Cursor::new(Vec::with_capacity(bytes.len()));
                profile.write(&mut out, black_box(reference)).unwrap();
                black_box(out);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parameter_parsing,
    bench_profile_generation,
    bench_codec
);
criterion_main!(benches);
