use assert_cmd::Command;
use predicates::str::contains;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/blog.toml");

fn folio() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("folio"));
    cmd.env_remove("FOLIO_CONFIG_FILE")
        .env("RUST_LOG", "error")
        .args(["--log-level", "error"]);
    cmd
}

#[test]
fn aggregates_print_tag_and_month_counts() {
    let assert = folio()
        .args(["aggregates", "--fixture", FIXTURE])
        .args(["--at", "2024-06-01T00:00:00Z"])
        .assert()
        .success();

    let output: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json output");
    assert_eq!(output["locale"], "en");
    assert_eq!(output["tags"][0]["name"], "rust");
    assert_eq!(output["tags"][0]["count"], 2);

    let months: Vec<&str> = output["months"]
        .as_array()
        .expect("months")
        .iter()
        .filter_map(|row| row["month"].as_str())
        .collect();
    assert_eq!(months, vec!["2024-02", "2024-01"]);
}

#[test]
fn privileged_menus_include_expired_posts() {
    folio()
        .args(["menus", "--fixture", FIXTURE, "--flat", "--privileged"])
        .args(["--at", "2024-06-01T00:00:00Z"])
        .assert()
        .success()
        .stdout(contains("\"month-2024-04\""))
        .stdout(contains("\"blog-authors\""));
}

#[test]
fn menu_order_can_be_overridden() {
    let assert = folio()
        .args(["menus", "--fixture", FIXTURE, "--menus", "tags"])
        .args(["--at", "2024-06-01T00:00:00Z"])
        .assert()
        .success();

    let output: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json output");
    let roots = output["menus"].as_array().expect("menus");
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["id"], "blog-tags");
}

#[test]
fn posts_page_lists_published_posts_for_the_locale() {
    let assert = folio()
        .args(["posts", "--fixture", FIXTURE, "--page", "1"])
        .args(["--at", "2024-06-01T00:00:00Z"])
        .assert()
        .success();

    let output: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json output");
    assert_eq!(output["total_items"], 2);
    assert_eq!(output["posts"][0]["slug"], "cache-invalidation-in-practice");
    assert_eq!(
        output["posts"][1]["link"],
        "/en/blog/2024/01/05/hello-world/"
    );
}

#[test]
fn entries_can_be_limited_to_authors() {
    let assert = folio()
        .args(["entries", "--fixture", FIXTURE, "--author", "ada"])
        .args(["--at", "2024-06-01T00:00:00Z"])
        .assert()
        .success();

    let output: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json output");
    let slugs: Vec<&str> = output["posts"]
        .as_array()
        .expect("posts")
        .iter()
        .filter_map(|post| post["slug"].as_str())
        .collect();
    assert_eq!(slugs, vec!["hello-world"]);
}

#[test]
fn missing_fixture_fails() {
    folio()
        .args(["menus", "--fixture", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(contains("application error"));
}
