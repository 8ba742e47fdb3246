fn main() {
    // Exposes build metadata (version, branch, commit) as the `build` module.
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
