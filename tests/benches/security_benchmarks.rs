//! # WS-Sec Benchmarks
//!
//! | Stage | Measures |
//! |-------|----------|
//! | Canonicalization | exclusive C14N of a Body into a hash stream |
//! | Signature | sign and verify over canonical references |
//! | Pipeline | full inbound authenticate-and-authorize |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use security_runtime::{SecurityConfig, SecurityPipeline, SecurityToken};
use shared_crypto::{DigestAlgorithm, Ed25519KeyPair};
use shared_types::XmlElement;
use std::sync::Arc;
use std::time::Duration;
use ws_01_canonicalization::{ExclusiveCanonicalizer, HashStream};
use ws_02_claims::WellKnownClaimSets;
use ws_03_endpoint_identity::EndpointIdentity;
use ws_04_signature::SignatureEngine;

/// Envelope whose Body holds `items` line items.
fn envelope(items: usize) -> XmlElement {
    let lines: String = (0..items)
        .map(|i| format!(r#"<Line n="{i}"><Sku>sku-{i}</Sku><Qty>{}</Qty></Line>"#, i % 7))
        .collect();
    XmlElement::parse(&format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:u="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd"><s:Body u:Id="body"><Order xmlns="urn:shop">{lines}</Order></s:Body></s:Envelope>"#
    ))
    .unwrap()
}

// ============================================================================
// CANONICALIZATION
// ============================================================================

fn bench_canonical_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ws-01-canonicalization");
    for items in [10, 100, 1000] {
        let document = envelope(items);
        let body = document.child_elements().next().unwrap().clone();
        group.throughput(Throughput::Elements(items as u64));
        group.bench_with_input(BenchmarkId::new("c14n_sha256", items), &body, |b, body| {
            b.iter(|| {
                let mut hash = DigestAlgorithm::Sha256.new_hash();
                let mut stream = HashStream::new(hash.as_mut());
                ExclusiveCanonicalizer::new()
                    .canonicalize_to(body, &mut stream)
                    .unwrap();
                black_box(stream.flush_hash_and_get_value(None))
            })
        });
    }
    group.finish();
}

// ============================================================================
// SIGNATURE ENGINE
// ============================================================================

fn bench_sign_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("ws-04-signature");
    group.measurement_time(Duration::from_secs(5));
    let key = Ed25519KeyPair::generate();
    let public = key.public_key();
    let engine = SignatureEngine::default();
    let document = envelope(100);
    let signature = engine.sign(&document, &["body"], &key, None).unwrap();

    group.bench_function("sign_ed25519", |b| {
        b.iter(|| black_box(engine.sign(&document, &["body"], &key, None).unwrap()))
    });
    group.bench_function("verify_ed25519", |b| {
        b.iter(|| black_box(engine.verify(&document, &signature, &public).unwrap()))
    });
    group.finish();
}

// ============================================================================
// PIPELINE
// ============================================================================

fn bench_inbound_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("security-runtime");
    let pipeline = SecurityPipeline::new(SecurityConfig::default(), Arc::new(WellKnownClaimSets::new()));
    let key = Ed25519KeyPair::generate();
    let token = SecurityToken::principal(
        EndpointIdentity::dns("bench.example"),
        None,
        Arc::new(key.public_key()),
    );
    let mut document = envelope(100);
    let message = pipeline
        .secure_outbound(&mut document, &key, None, &[])
        .unwrap();

    group.throughput(Throughput::Bytes(message.len() as u64));
    group.bench_function("authenticate_and_authorize", |b| {
        b.iter(|| black_box(pipeline.authenticate_and_authorize(&message, &token).unwrap()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_canonical_digest,
    bench_sign_verify,
    bench_inbound_pipeline
);
criterion_main!(benches);
