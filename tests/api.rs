use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use courselib_db::seed;
use courselib_kernel::settings::Settings;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn app() -> Router {
    let store = courselib_app::in_memory_store();
    seed::load(store.as_ref()).await.unwrap();
    let registry = courselib_app::build_registry(store);
    courselib_http::build_router(&registry, &Settings::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Reply {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    reply(app, request).await
}

async fn send_raw(app: &Router, method: Method, uri: &str, content_type: &str, body: &str) -> Reply {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    reply(app, request).await
}

async fn reply(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply {
        status,
        headers,
        body,
    }
}

fn berry() -> Uuid {
    seed::authors()[0].id
}

fn berry_course() -> Uuid {
    seed::courses()[0].id
}

fn courses_uri(author_id: Uuid) -> String {
    format!("/api/authors/{author_id}/courses")
}

fn course_uri(author_id: Uuid, course_id: Uuid) -> String {
    format!("/api/authors/{author_id}/courses/{course_id}")
}

#[tokio::test]
async fn health_check_responds() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn authors_are_listed_by_name_and_filtered() {
    let app = app().await;

    let all = send(&app, Method::GET, "/api/authors", None).await;
    assert_eq!(all.status, StatusCode::OK);
    let names: Vec<&str> = all.body.as_array().unwrap().iter().map(|a| a["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        [
            "Arnold The Unseen Stafford",
            "Berry Griffin Beak Eldritch",
            "Eli Ivory Bones Sweet",
            "Nancy Swashbuckler Rye",
        ]
    );

    let singing = send(&app, Method::GET, "/api/authors?mainCategory=%20Singing%20", None).await;
    assert_eq!(singing.body.as_array().unwrap().len(), 2);

    let search = send(&app, Method::GET, "/api/authors?searchQuery=Rye", None).await;
    let found = search.body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["mainCategory"], "Rum");
}

#[tokio::test]
async fn head_and_options_on_authors() {
    let app = app().await;

    let head = send(&app, Method::HEAD, "/api/authors", None).await;
    assert_eq!(head.status, StatusCode::OK);
    assert_eq!(head.body, Value::Null);

    let options = send(&app, Method::OPTIONS, "/api/authors", None).await;
    assert_eq!(options.status, StatusCode::OK);
    assert_eq!(options.headers[header::ALLOW], "GET,HEAD,OPTIONS,POST");
}

#[tokio::test]
async fn unknown_and_malformed_author_ids() {
    let app = app().await;

    let missing = send(&app, Method::GET, &format!("/api/authors/{}", Uuid::now_v7()), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.headers[header::CONTENT_TYPE], "application/problem+json");
    assert!(missing.body["traceId"].is_string());

    let malformed = send(&app, Method::GET, "/api/authors/not-a-guid", None).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["instance"], "/api/authors/not-a-guid");
}

#[tokio::test]
async fn author_is_created_with_nested_courses() {
    let app = app().await;

    let created = send(
        &app,
        Method::POST,
        "/api/authors",
        Some(json!({
            "firstName": "Jane",
            "lastName": "Skewers",
            "dateOfBirth": "1968-03-04T00:00:00+00:00",
            "mainCategory": "Rum",
            "courses": [
                { "title": "Top Pirate Hits of Last Decade", "description": "Learn the lyrics." }
            ]
        })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["name"], "Jane Skewers");

    let id = created.body["id"].as_str().unwrap().to_string();
    let location = created.headers[header::LOCATION].to_str().unwrap().to_string();
    assert_eq!(location, format!("/api/authors/{id}"));

    let fetched = send(&app, Method::GET, &location, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);

    let courses = send(&app, Method::GET, &format!("{location}/courses"), None).await;
    let courses = courses.body.as_array().unwrap().clone();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["authorId"], id.as_str());
}

#[tokio::test]
async fn invalid_nested_course_rejects_the_author() {
    let app = app().await;

    let rejected = send(
        &app,
        Method::POST,
        "/api/authors",
        Some(json!({
            "firstName": "Jane",
            "lastName": "Skewers",
            "dateOfBirth": "1968-03-04T00:00:00Z",
            "mainCategory": "Rum",
            "courses": [{ "title": "Same", "description": "Same" }]
        })),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        rejected.body["errors"]["courses[0].course"][0],
        "Course title cannot match description."
    );

    let search = send(&app, Method::GET, "/api/authors?searchQuery=Skewers", None).await;
    assert!(search.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn course_matching_its_description_is_rejected() {
    let app = app().await;

    let rejected = send(
        &app,
        Method::POST,
        &courses_uri(berry()),
        Some(json!({ "title": "Same", "description": "Same" })),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(rejected.body["type"], "https://courselibrary.com/modelvalidationproblem");
    assert_eq!(rejected.body["errors"]["course"][0], "Course title cannot match description.");
    assert_eq!(rejected.body["instance"], courses_uri(berry()));
}

#[tokio::test]
async fn course_is_created_under_its_author() {
    let app = app().await;

    let created = send(
        &app,
        Method::POST,
        &courses_uri(berry()),
        Some(json!({ "title": "A Pirate's Guide to Knots" })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["authorId"], berry().to_string());
    assert!(created.body["description"].is_null());

    let id: Uuid = created.body["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(created.headers[header::LOCATION], course_uri(berry(), id).as_str());

    let listed = send(&app, Method::GET, &courses_uri(berry()), None).await;
    let titles: Vec<&str> = listed.body.as_array().unwrap().iter().map(|c| c["title"].as_str().unwrap()).collect();
    assert_eq!(
        titles,
        [
            "A Pirate's Guide to Knots",
            "Commandeering a Ship Without Getting Caught",
            "Overthrowing Mutiny",
        ]
    );
}

#[tokio::test]
async fn courses_of_unknown_author_are_not_found() {
    let app = app().await;
    let unknown = Uuid::now_v7();

    let listed = send(&app, Method::GET, &courses_uri(unknown), None).await;
    assert_eq!(listed.status, StatusCode::NOT_FOUND);

    let created = send(&app, Method::POST, &courses_uri(unknown), Some(json!({ "title": "Orphan" }))).await;
    assert_eq!(created.status, StatusCode::NOT_FOUND);

    // A real course looked up through the wrong author
    let foreign = seed::authors()[1].id;
    let fetched = send(&app, Method::GET, &course_uri(foreign, berry_course()), None).await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_creates_missing_course_and_updates_existing_one() {
    let app = app().await;
    let course_id = Uuid::now_v7();
    let uri = course_uri(berry(), course_id);

    let created = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "title": "Sailing", "description": "Into the sunset" })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["id"], course_id.to_string());
    assert_eq!(created.headers[header::LOCATION], uri.as_str());

    let updated = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "title": "Sailing", "description": "Into the sunrise" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::NO_CONTENT);

    let fetched = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched.body["description"], "Into the sunrise");
    assert_eq!(fetched.body["authorId"], berry().to_string());
}

#[tokio::test]
async fn put_requires_description() {
    let app = app().await;
    let uri = course_uri(berry(), berry_course());

    let rejected = send(&app, Method::PUT, &uri, Some(json!({ "title": "Only a title" }))).await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(rejected.body["errors"]["description"][0], "Course description is required.");
}

#[tokio::test]
async fn put_with_course_id_of_another_author_conflicts() {
    let app = app().await;
    let nancy = seed::authors()[1].id;

    let conflict = send(
        &app,
        Method::PUT,
        &course_uri(nancy, berry_course()),
        Some(json!({ "title": "Stolen", "description": "Not yours" })),
    )
    .await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);

    let original = send(&app, Method::GET, &course_uri(berry(), berry_course()), None).await;
    assert_eq!(original.body["title"], "Commandeering a Ship Without Getting Caught");
}

#[tokio::test]
async fn empty_patch_leaves_course_unchanged() {
    let app = app().await;
    let uri = course_uri(berry(), berry_course());
    let before = send(&app, Method::GET, &uri, None).await;

    let patched = send_raw(&app, Method::PATCH, &uri, "application/json-patch+json", "[]").await;
    assert_eq!(patched.status, StatusCode::NO_CONTENT);

    let after = send(&app, Method::GET, &uri, None).await;
    assert_eq!(after.body, before.body);
}

#[tokio::test]
async fn empty_patch_on_course_without_description_requires_one() {
    let app = app().await;

    let created = send(
        &app,
        Method::POST,
        &courses_uri(berry()),
        Some(json!({ "title": "No description" })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let uri = created.headers[header::LOCATION].to_str().unwrap().to_string();

    let rejected = send_raw(&app, Method::PATCH, &uri, "application/json-patch+json", "[]").await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(rejected.body["errors"]["description"][0], "Course description is required.");

    let supplied = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!([{ "op": "add", "path": "/description", "value": "Now described" }])),
    )
    .await;
    assert_eq!(supplied.status, StatusCode::NO_CONTENT);

    let after = send(&app, Method::GET, &uri, None).await;
    assert_eq!(after.body["description"], "Now described");
}

#[tokio::test]
async fn patch_replaces_members() {
    let app = app().await;
    let uri = course_uri(berry(), berry_course());

    let patched = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!([{ "op": "replace", "path": "/title", "value": "Commandeering, Revisited" }])),
    )
    .await;
    assert_eq!(patched.status, StatusCode::NO_CONTENT);

    let after = send(&app, Method::GET, &uri, None).await;
    assert_eq!(after.body["title"], "Commandeering, Revisited");
    assert_eq!(after.body["id"], berry_course().to_string());
}

#[tokio::test]
async fn patch_breaking_business_rule_is_not_saved() {
    let app = app().await;
    let uri = course_uri(berry(), berry_course());
    let before = send(&app, Method::GET, &uri, None).await;

    let rejected = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!([{ "op": "copy", "from": "/title", "path": "/description" }])),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(rejected.body["errors"]["course"][0], "Course title cannot match description.");

    let after = send(&app, Method::GET, &uri, None).await;
    assert_eq!(after.body, before.body);
}

#[tokio::test]
async fn patch_on_unknown_member_is_unprocessable() {
    let app = app().await;
    let uri = course_uri(berry(), berry_course());

    let rejected = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!([{ "op": "replace", "path": "/rating", "value": 5 }])),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(rejected.body["errors"]["rating"].is_array());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app().await;

    let rejected = send_raw(
        &app,
        Method::POST,
        &courses_uri(berry()),
        "application/json",
        "{ \"title\": ",
    )
    .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.headers[header::CONTENT_TYPE], "application/problem+json");
    assert!(rejected.body["errors"]["$"].is_array());
}

#[tokio::test]
async fn deleting_a_course_removes_only_that_course() {
    let app = app().await;
    let uri = course_uri(berry(), berry_course());

    let deleted = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    assert_eq!(send(&app, Method::GET, &uri, None).await.status, StatusCode::NOT_FOUND);
    let remaining = send(&app, Method::GET, &courses_uri(berry()), None).await;
    assert_eq!(remaining.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_an_author_cascades_to_courses() {
    let app = app().await;

    let deleted = send(&app, Method::DELETE, &format!("/api/authors/{}", berry()), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let courses = send(&app, Method::GET, &courses_uri(berry()), None).await;
    assert_eq!(courses.status, StatusCode::NOT_FOUND);
    let course = send(&app, Method::GET, &course_uri(berry(), berry_course()), None).await;
    assert_eq!(course.status, StatusCode::NOT_FOUND);

    let again = send(&app, Method::DELETE, &format!("/api/authors/{}", berry()), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_collection_requires_every_id() {
    let app = app().await;
    let authors = seed::authors();

    let found = send(
        &app,
        Method::GET,
        &format!("/api/authorcollections/{},{}", authors[1].id, authors[0].id),
        None,
    )
    .await;
    assert_eq!(found.status, StatusCode::OK);
    let ids: Vec<&str> = found.body.as_array().unwrap().iter().map(|a| a["id"].as_str().unwrap()).collect();
    assert_eq!(ids, [authors[0].id.to_string(), authors[1].id.to_string()]);

    let partial = send(
        &app,
        Method::GET,
        &format!("/api/authorcollections/{},{}", authors[0].id, Uuid::now_v7()),
        None,
    )
    .await;
    assert_eq!(partial.status, StatusCode::NOT_FOUND);

    let blank = send(&app, Method::GET, "/api/authorcollections/%20,", None).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert!(blank.body["errors"]["ids"].is_array());
}

#[tokio::test]
async fn author_collection_is_created_in_one_batch() {
    let app = app().await;

    let created = send(
        &app,
        Method::POST,
        "/api/authorcollections",
        Some(json!([
            {
                "firstName": "Anne",
                "lastName": "Bonny",
                "dateOfBirth": "1697-03-08T00:00:00Z",
                "mainCategory": "Ships"
            },
            {
                "firstName": "Mary",
                "lastName": "Read",
                "dateOfBirth": "1685-01-01T00:00:00Z",
                "mainCategory": "Ships",
                "courses": [{ "title": "Disguises", "description": "Blending in aboard." }]
            }
        ])),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body.as_array().unwrap().len(), 2);

    let location = created.headers[header::LOCATION].to_str().unwrap().to_string();
    assert!(location.starts_with("/api/authorcollections/"));

    let fetched = send(&app, Method::GET, &location, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn author_collection_with_one_invalid_author_creates_none() {
    let app = app().await;

    let rejected = send(
        &app,
        Method::POST,
        "/api/authorcollections",
        Some(json!([
            {
                "firstName": "Anne",
                "lastName": "Bonny",
                "dateOfBirth": "1697-03-08T00:00:00Z",
                "mainCategory": "Ships"
            },
            {
                "firstName": "Mary",
                "lastName": "Read",
                "dateOfBirth": "1685-01-01T00:00:00Z",
                "mainCategory": "Ships",
                "courses": [{ "description": "No title" }]
            }
        ])),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(rejected.body["errors"]["[1].courses[0].title"].is_array());

    let ships = send(&app, Method::GET, "/api/authors?mainCategory=Ships", None).await;
    assert_eq!(ships.body.as_array().unwrap().len(), 1);

    let empty = send(&app, Method::POST, "/api/authorcollections", Some(json!([]))).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_document_lists_every_resource() {
    let app = app().await;

    let doc = send(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(doc.status, StatusCode::OK);
    let paths = doc.body["paths"].as_object().unwrap();
    for path in [
        "/api/authors",
        "/api/authors/{author_id}",
        "/api/authors/{author_id}/courses",
        "/api/authors/{author_id}/courses/{course_id}",
        "/api/authorcollections",
        "/api/authorcollections/{ids}",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(doc.body["components"]["schemas"]["CourseForUpdateDto"].is_object());
}
