use std::{fs, path::Path};

fn main() {
    dotenv::dotenv().ok();
    println!("cargo:rerun-if-changed=../../frontend/dist");

    // ServeDir needs the directory to exist; ship a placeholder until the UI is built
    let dist_path = Path::new("../../frontend/dist");
    if !dist_path.exists() {
        println!("cargo:warning=Creating placeholder frontend/dist directory");
        fs::create_dir_all(dist_path).unwrap();

        let placeholder = r#"<!DOCTYPE html>
<html><head><title>Nhung Consultancy</title></head>
<body><h1>Frontend not built</h1></body></html>"#;

        fs::write(dist_path.join("index.html"), placeholder).unwrap();
    }
}
