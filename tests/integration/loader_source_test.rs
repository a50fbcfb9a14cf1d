//! Integration tests for resolving and evaluating script sources

use std::{sync::Arc, thread};

use routescript::{DslError, Loader, ScriptSource, load};

use crate::common::{TestFixture, beans_script, components_script, rest_script, routes_script};

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_load_from_file_path() {
    let fixture = TestFixture::new();
    let path = fixture.create_script("routes.lua", routes_script());

    let model = load(path.as_path()).unwrap();
    assert_eq!(model.routes().len(), 1);
}

#[test]
fn test_load_with_file_prefix() {
    let fixture = TestFixture::new();
    let path = fixture.create_script("rest.lua", rest_script());

    let model = load(format!("file:{}", path.display())).unwrap();
    assert_eq!(model.rest_definitions().count(), 2);
}

#[test]
fn test_load_from_classpath() {
    let fixture = TestFixture::new();
    fixture.create_script("camel/beans.lua", beans_script());

    let model = Loader::new()
        .with_script_root(&fixture.routes_dir)
        .load("classpath:camel/beans.lua")
        .unwrap();

    assert_eq!(model.beans().len(), 2);
}

#[test]
fn test_classpath_roots_are_searched_in_order() {
    let fixture = TestFixture::new();
    fixture.create_script_in("first", "main.lua", r#"from("direct:first")"#);
    fixture.create_script_in("second", "main.lua", r#"from("direct:second")"#);
    fixture.create_script_in("second", "only.lua", r#"from("direct:only")"#);

    let loader = Loader::new()
        .with_script_root(fixture.path("first"))
        .with_script_root(fixture.path("second"));

    let model = loader.load("classpath:main.lua").unwrap();
    assert_eq!(model.routes()[0].input, "direct:first");

    let model = loader.load("classpath:/only.lua").unwrap();
    assert_eq!(model.routes()[0].input, "direct:only");
}

#[test]
fn test_missing_file_is_resource_not_found() {
    let fixture = TestFixture::new();
    let missing = fixture.routes_dir.join("missing.lua");

    let err = load(missing.as_path()).unwrap_err();
    assert!(matches!(err.cause(), DslError::ResourceNotFound { .. }));
    assert_eq!(err.script, missing.display().to_string());
}

#[test]
fn test_missing_classpath_entry() {
    let fixture = TestFixture::new();

    let err = Loader::new()
        .with_script_root(&fixture.routes_dir)
        .load("classpath:nowhere.lua")
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        DslError::ResourceNotFound { reference } if reference == "classpath:nowhere.lua"
    ));
}

#[test]
fn test_directory_is_not_a_script() {
    let fixture = TestFixture::new();

    let err = load(fixture.routes_dir.as_path()).unwrap_err();
    assert!(matches!(err.cause(), DslError::ResourceNotFound { .. }));
}

#[test]
fn test_non_utf8_script_is_unreadable() {
    let fixture = TestFixture::new();
    let path = fixture.routes_dir.join("binary.lua");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x9f]).unwrap();

    let err = load(path.as_path()).unwrap_err();
    assert!(matches!(err.cause(), DslError::Unreadable { .. }));
}

#[test]
fn test_source_parsing() {
    assert_eq!(
        ScriptSource::parse("classpath:/camel/routes.lua"),
        ScriptSource::Classpath("camel/routes.lua".to_string())
    );
    assert_eq!(
        ScriptSource::parse("file:/etc/routes.lua"),
        ScriptSource::File("/etc/routes.lua".into())
    );
    assert_eq!(
        ScriptSource::parse("routes.lua"),
        ScriptSource::File("routes.lua".into())
    );
    assert_eq!(
        ScriptSource::parse("classpath:a.lua").to_string(),
        "classpath:a.lua"
    );
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_loading_twice_gives_equal_models() {
    let fixture = TestFixture::new();
    let script = [
        routes_script(),
        rest_script(),
        beans_script(),
        components_script(),
    ]
    .concat();
    let path = fixture.create_script("all.lua", &script);

    let first = load(path.as_path()).unwrap();
    let second = load(path.as_path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_syntax_error() {
    let err = Loader::new()
        .load_str("broken.lua", r#"from("direct:a"):to("#)
        .unwrap_err();

    assert!(matches!(err.cause(), DslError::Syntax { .. }));
    assert_eq!(err.script, "broken.lua");
    assert!(err.to_string().contains("broken.lua"));
}

#[test]
fn test_runtime_error_in_plain_code() {
    let err = Loader::new()
        .load_str("broken.lua", "local x = nil\nx.field = 1")
        .unwrap_err();

    assert!(matches!(err.cause(), DslError::Script { .. }));
}

#[test]
fn test_first_failure_halts_the_script() {
    let err = Loader::new()
        .load_str(
            "halt.lua",
            r#"
from("direct:a"):process("first")
from("direct:b"):process("second")
"#,
        )
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        DslError::UnresolvedReference { name, .. } if name == "first"
    ));
}

#[test]
fn test_swallowed_failure_is_still_reported() {
    let err = Loader::new()
        .load_str(
            "pcall.lua",
            r#"
pcall(function()
    component "kafka" {}
end)
from("direct:a"):to("mock:a")
"#,
        )
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        DslError::UnresolvedReference { name, .. } if name == "kafka"
    ));
}

#[test]
fn test_scripts_are_sandboxed() {
    let loader = Loader::new();

    for script in [
        r#"io.open("/etc/passwd")"#,
        r#"os.exit(1)"#,
        r#"require("socket")"#,
        r#"dofile("/tmp/other.lua")"#,
    ] {
        let err = loader.load_str("sandbox.lua", script).unwrap_err();
        assert!(
            matches!(err.cause(), DslError::Script { .. }),
            "Expected {} to be refused, got {:?}",
            script,
            err.cause()
        );
    }

    let model = loader
        .load_str(
            "sandbox.lua",
            r#"
local stamp = string.format("%s-%d", "tick", math.max(1, 0))
if type(os.time()) == "number" then
    from("timer:" .. stamp)
end
"#,
        )
        .unwrap();
    assert_eq!(model.routes()[0].input, "timer:tick-1");
}

#[test]
fn test_merge_helper_is_available() {
    let model = Loader::new()
        .load_str(
            "merge.lua",
            r#"
local defaults = { driverClassName = "org.h2.Driver", username = "sa" }
bean("dataSource", "BasicDataSource", merge(defaults, { url = "jdbc:h2:mem:x" }))
"#,
        )
        .unwrap();

    let bean = model.bean("dataSource").unwrap();
    assert_eq!(bean.properties.len(), 3);
}

#[test]
fn test_concurrent_loads_share_a_loader() {
    let loader = Arc::new(Loader::new());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let loader = Arc::clone(&loader);
            thread::spawn(move || {
                let script = format!(r#"from("seda:queue{}"):to("mock:out")"#, i);
                loader.load_str("threaded.lua", &script)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let model = handle.join().unwrap().unwrap();
        assert_eq!(model.routes()[0].input, format!("seda:queue{}", i));
    }
}
