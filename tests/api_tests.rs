// tests/api_tests.rs

use std::sync::Arc;

use jsonwebtoken::{EncodingKey, Header, encode};
use school_ranks::{
    config::Config,
    routes,
    state::AppState,
    store::MemoryStore,
    utils::jwt::Claims,
};
use serde_json::{Value, json};

const SECRET: &str = "test_secret_for_integration_tests";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let config = Config {
        database_url: None,
        jwt_secret: SECRET.to_string(),
        rust_log: "error".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
    };

    let state = AppState::new(Arc::new(MemoryStore::new()), config);
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Mints a token the way the identity platform would.
fn bearer(role: &str) -> String {
    let claims = Claims {
        sub: "staff-1".to_string(),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() + 600) as u64,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("Failed to sign token");
    format!("Bearer {}", token)
}

async fn create_result(
    client: &reqwest::Client,
    address: &str,
    subject: &str,
    student: &str,
    score: f64,
    max_marks: f64,
) -> Value {
    let response = client
        .post(format!("{}/api/admin/results", address))
        .header("Authorization", bearer("teacher"))
        .json(&json!({
            "schoolId": "school-1",
            "classId": "class-7",
            "sectionId": "sec-a",
            "subjectId": subject,
            "studentId": student,
            "score": score,
            "maxMarks": max_marks
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    response.json().await.expect("Failed to parse result json")
}

async fn compute(client: &reqwest::Client, address: &str, subject: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/admin/rankings/compute", address))
        .header("Authorization", bearer("teacher"))
        .json(&json!({
            "schoolId": "school-1",
            "classId": "class-7",
            "sectionId": "sec-a",
            "subjectId": subject
        }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn unknown_path_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn staff_routes_require_a_staff_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/admin/rankings/compute", address);
    let body = json!({"schoolId": "s", "classId": "c", "sectionId": "a", "subjectId": "m"});

    let anonymous = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);

    let forged = client
        .post(&url)
        .header("Authorization", "Bearer not-a-token")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status().as_u16(), 401);

    let student = client
        .post(&url)
        .header("Authorization", bearer("student"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(student.status().as_u16(), 403);
    let body: Value = student.json().await.unwrap();
    assert_eq!(body["error"], "Staff role required");

    let admin = client
        .post(&url)
        .header("Authorization", bearer("admin"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(admin.status().as_u16(), 200);
}

#[tokio::test]
async fn creating_a_result_derives_percentage() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let created = create_result(&client, &address, "math", "st-1", 45.0, 60.0).await;
    assert_eq!(created["percentage"], 75.0);
    assert_eq!(created["rankInClass"], Value::Null);

    let id = created["id"].as_str().unwrap();
    let fetched: Value = client
        .get(format!("{}/api/results/{}", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["studentId"], "st-1");
}

#[tokio::test]
async fn invalid_marks_are_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for (score, max_marks) in [(120.0, 100.0), (-1.0, 100.0), (10.0, 0.0)] {
        let response = client
            .post(format!("{}/api/admin/results", address))
            .header("Authorization", bearer("teacher"))
            .json(&json!({
                "schoolId": "school-1",
                "classId": "class-7",
                "sectionId": "sec-a",
                "subjectId": "math",
                "studentId": "st-1",
                "score": score,
                "maxMarks": max_marks
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "score {score} / {max_marks}");
    }
}

#[tokio::test]
async fn whitespace_only_ids_are_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let result = client
        .post(format!("{}/api/admin/results", address))
        .header("Authorization", bearer("teacher"))
        .json(&json!({
            "schoolId": " ",
            "classId": "class-7",
            "sectionId": "sec-a",
            "subjectId": "math",
            "studentId": "st-1",
            "score": 10.0,
            "maxMarks": 20.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(result.status().as_u16(), 400);
    let body: Value = result.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("schoolId is required"));

    let student = client
        .post(format!("{}/api/admin/students", address))
        .header("Authorization", bearer("teacher"))
        .json(&json!({
            "schoolId": "school-1",
            "classId": "\t",
            "sectionId": "sec-a",
            "firstName": "Pupil",
            "rollNumber": "01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(student.status().as_u16(), 400);

    let listed: Vec<Value> = client
        .get(format!("{}/api/results", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn invalid_mark_updates_are_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let created = create_result(&client, &address, "math", "st-1", 40.0, 50.0).await;
    let url = format!("{}/api/admin/results/{}", address, created["id"].as_str().unwrap());

    for body in [
        json!({"score": -1.0}),
        json!({"maxMarks": 0.0}),
        json!({"maxMarks": 30.0}),
    ] {
        let response = client
            .put(&url)
            .header("Authorization", bearer("teacher"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "{body}");
    }

    let unchanged: Value = client
        .get(format!("{}/api/results/{}", address, created["id"].as_str().unwrap()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unchanged["maxMarks"], 50.0);
}

#[tokio::test]
async fn subject_leaderboard_reflects_computed_ranks() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for (student, score) in [("a", 90.0), ("b", 90.0), ("c", 80.0), ("d", 70.0)] {
        create_result(&client, &address, "math", student, score, 100.0).await;
    }

    let response = compute(&client, &address, "math").await;
    assert_eq!(response.status().as_u16(), 200);

    let leaders: Vec<Value> = client
        .get(format!(
            "{}/api/rankings/subject?schoolId=school-1&classId=class-7&sectionId=sec-a&subjectId=math&topN=3",
            address
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(leaders.len(), 3);
    let ranks: Vec<i64> = leaders
        .iter()
        .map(|r| r["rankInSection"].as_i64().unwrap())
        .collect();
    assert_eq!(ranks, vec![1, 1, 3]);
    assert_eq!(leaders[2]["rankInClass"], 3);
}

#[tokio::test]
async fn overall_leaderboard_aggregates_across_subjects() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let student: Value = client
        .post(format!("{}/api/admin/students", address))
        .header("Authorization", bearer("admin"))
        .json(&json!({
            "schoolId": "school-1",
            "classId": "class-7",
            "sectionId": "sec-a",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "rollNumber": "07"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ada = student["id"].as_str().unwrap();

    create_result(&client, &address, "math", ada, 80.0, 100.0).await;
    create_result(&client, &address, "art", ada, 60.0, 100.0).await;
    create_result(&client, &address, "math", "other", 50.0, 100.0).await;

    let leaders: Vec<Value> = client
        .get(format!(
            "{}/api/rankings/overall?schoolId=school-1&classId=class-7&sectionId=sec-a",
            address
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(leaders.len(), 2);
    assert_eq!(leaders[0]["studentId"], ada);
    assert_eq!(leaders[0]["averagePercentage"], 70.0);
    assert_eq!(leaders[0]["totalScore"], 140.0);
    assert_eq!(leaders[0]["rank"], 1);
    assert_eq!(leaders[0]["firstName"], "Ada");
    assert_eq!(leaders[0]["rollNumber"], "07");
    assert_eq!(leaders[0]["results"].as_array().unwrap().len(), 2);
    assert_eq!(leaders[1]["rank"], 2);
}

#[tokio::test]
async fn empty_scope_returns_empty_leaderboards() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for path in [
        "/api/rankings/subject?schoolId=x&classId=y&sectionId=z&subjectId=w",
        "/api/rankings/overall?schoolId=x&classId=y&sectionId=z",
    ] {
        let response = client
            .get(format!("{}{}", address, path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: Vec<Value> = response.json().await.unwrap();
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn missing_scope_ids_and_bad_top_n_are_400() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let missing_subject = client
        .get(format!(
            "{}/api/rankings/subject?schoolId=x&classId=y&sectionId=z",
            address
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_subject.status().as_u16(), 400);
    let body: Value = missing_subject.json().await.unwrap();
    assert_eq!(body["error"], "subjectId is required");

    let zero_top = client
        .get(format!(
            "{}/api/rankings/overall?schoolId=x&classId=y&sectionId=z&topN=0",
            address
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(zero_top.status().as_u16(), 400);

    let missing_section = client
        .post(format!("{}/api/admin/rankings/compute", address))
        .header("Authorization", bearer("teacher"))
        .json(&json!({"schoolId": "x", "classId": "y", "subjectId": "m"}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_section.status().as_u16(), 400);
}

#[tokio::test]
async fn updating_marks_keeps_rank_until_recomputed() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let low = create_result(&client, &address, "math", "low", 40.0, 100.0).await;
    create_result(&client, &address, "math", "high", 90.0, 100.0).await;
    compute(&client, &address, "math").await;

    let id = low["id"].as_str().unwrap();
    let response = client
        .put(format!("{}/api/admin/results/{}", address, id))
        .header("Authorization", bearer("teacher"))
        .json(&json!({"score": 95.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let url = format!("{}/api/results/{}", address, id);
    let stale: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(stale["percentage"], 95.0);
    assert_eq!(stale["rankInSection"], 2);

    compute(&client, &address, "math").await;
    let fresh: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fresh["rankInSection"], 1);
}

#[tokio::test]
async fn deleting_missing_records_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for path in ["/api/admin/results/nope", "/api/admin/students/nope"] {
        let response = client
            .delete(format!("{}{}", address, path))
            .header("Authorization", bearer("admin"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    let created = create_result(&client, &address, "math", "st-1", 10.0, 20.0).await;
    let id = created["id"].as_str().unwrap();
    let response = client
        .delete(format!("{}/api/admin/results/{}", address, id))
        .header("Authorization", bearer("admin"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let gone = client
        .get(format!("{}/api/results/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn students_can_be_listed_by_section() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for (section, roll) in [("sec-a", "02"), ("sec-a", "01"), ("sec-b", "01")] {
        let response = client
            .post(format!("{}/api/admin/students", address))
            .header("Authorization", bearer("teacher"))
            .json(&json!({
                "schoolId": "school-1",
                "classId": "class-7",
                "sectionId": section,
                "firstName": "Pupil",
                "rollNumber": roll
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    let listed: Vec<Value> = client
        .get(format!("{}/api/students?sectionId=sec-a", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let rolls: Vec<&str> = listed.iter().map(|s| s["rollNumber"].as_str().unwrap()).collect();
    assert_eq!(rolls, vec!["01", "02"]);
}
