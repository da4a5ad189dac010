fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/analysis.proto");
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/analysis.proto"], &["proto"])?;
    Ok(())
}
