use super::*;

fn resolve(base: &str, src: &str) -> String {
    resolve_media_src(base, src).unwrap()
}

#[test]
fn empty_source_stays_empty() {
    assert_eq!(resolve("https://cdn.example/deck/", "  "), "");
}

#[test]
fn absolute_sources_pass_through() {
    assert_eq!(
        resolve("assets", "https://img.example/a.jpg"),
        "https://img.example/a.jpg"
    );
    assert_eq!(resolve("assets", "/srv/a.jpg"), "/srv/a.jpg");
    assert_eq!(
        resolve("assets", "data:image/png;base64,AAAA"),
        "data:image/png;base64,AAAA"
    );
    assert_eq!(resolve("assets", "C:\\img\\a.jpg"), "C:\\img\\a.jpg");
}

#[test]
fn relative_sources_join_url_bases() {
    assert_eq!(
        resolve("https://cdn.example/deck/", "img/a.jpg"),
        "https://cdn.example/deck/img/a.jpg"
    );
    assert_eq!(
        resolve("https://cdn.example/deck/v2", "../shared/./b.jpg"),
        "https://cdn.example/deck/shared/b.jpg"
    );
    assert_eq!(
        resolve("https://cdn.example", "a.jpg"),
        "https://cdn.example/a.jpg"
    );
    assert_eq!(resolve("file:///srv/deck", "a.jpg"), "file:///srv/deck/a.jpg");
}

#[test]
fn base_query_is_not_part_of_the_path() {
    assert_eq!(
        resolve("https://cdn.example/deck/?v=2", "a.jpg"),
        "https://cdn.example/deck/a.jpg"
    );
    assert_eq!(
        resolve("https://cdn.example/deck?v=2", "a.jpg"),
        "https://cdn.example/deck/a.jpg"
    );
}

#[test]
fn source_fragment_keeps_the_file_name() {
    assert_eq!(
        resolve("https://cdn.example/deck/", "a.jpg#x/../y"),
        "https://cdn.example/deck/a.jpg#x/../y"
    );
}

#[test]
fn protocol_relative_sources_take_the_base_scheme() {
    assert_eq!(
        resolve("https://cdn.example/deck/", "//img.example/a.jpg"),
        "https://img.example/a.jpg"
    );
}

#[test]
fn host_rooted_sources_replace_the_base_path() {
    assert_eq!(
        resolve("https://cdn.example/deck/", "/shared/a.jpg"),
        "https://cdn.example/shared/a.jpg"
    );
}

#[test]
fn unparsable_url_base_is_a_validation_error() {
    let err = resolve_media_src("https://exa mple.com/deck/", "a.jpg").unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)), "{err}");
}

#[test]
fn relative_sources_join_path_bases() {
    assert_eq!(resolve("assets/", "a.jpg"), "assets/a.jpg");
    assert_eq!(resolve("/srv/deck", "img\\a.jpg"), "/srv/deck/img/a.jpg");
    assert_eq!(resolve("", "./a.jpg"), "a.jpg");
    assert_eq!(resolve("/srv", "../../a.jpg"), "/a.jpg");
}

#[test]
fn leading_parent_segments_survive_on_relative_bases() {
    assert_eq!(resolve("a/b", "../../../c.jpg"), "../c.jpg");
    assert_eq!(resolve("../deck", "../img/a.jpg"), "../img/a.jpg");
    assert_eq!(resolve("", "../a.jpg"), "../a.jpg");
}
