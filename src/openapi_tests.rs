#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;
    use utoipa::openapi::{PathItemType, RefOr, schema::Schema};

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        let components = openapi.components.as_ref().unwrap();

        for name in [
            "ErrorResponse",
            "HealthResponse",
            "CreateUserRequest",
            "CreateSuperuserRequest",
            "UpdateUserRequest",
            "UserResponse",
            "RoleChoice",
            "Role",
        ] {
            assert!(components.schemas.contains_key(name), "missing schema {}", name);
        }

        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_user_response_schema_structure() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let user_schema = components.schemas.get("UserResponse").unwrap();

        if let RefOr::T(Schema::Object(obj)) = user_schema {
            let properties = &obj.properties;
            for field in [
                "id",
                "email",
                "username",
                "name",
                "role",
                "is_staff",
                "is_active",
                "is_superuser",
                "has_usable_password",
                "date_joined",
                "last_login",
            ] {
                assert!(properties.contains_key(field), "missing field {}", field);
            }
            assert!(!properties.contains_key("password"));
        } else {
            panic!("UserResponse should be an object schema");
        }
    }

    #[test]
    fn test_role_schema_lists_stored_values() {
        let openapi = ApiDoc::openapi();
        let openapi_json = serde_json::to_value(&openapi).unwrap();

        let role_values = &openapi_json["components"]["schemas"]["Role"]["enum"];
        assert_eq!(role_values, &serde_json::json!(["organizer", "guide", "attendee"]));
    }

    #[test]
    fn test_openapi_paths() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        let expected = [
            ("/health", PathItemType::Get, "GET"),
            ("/api/v1/users", PathItemType::Get, "GET"),
            ("/api/v1/users", PathItemType::Post, "POST"),
            ("/api/v1/users/{user_id}", PathItemType::Get, "GET"),
            ("/api/v1/users/{user_id}", PathItemType::Put, "PUT"),
            ("/api/v1/users/{user_id}", PathItemType::Delete, "DELETE"),
            ("/api/v1/superusers", PathItemType::Post, "POST"),
            ("/api/v1/roles", PathItemType::Get, "GET"),
            ("/api/v1/roles/{role}/users", PathItemType::Get, "GET"),
            ("/api/v1/roles/{role}/users", PathItemType::Post, "POST"),
            ("/api/v1/roles/{role}/users/{user_id}", PathItemType::Get, "GET"),
        ];

        for (path, method, method_name) in expected {
            let item = paths
                .get(path)
                .unwrap_or_else(|| panic!("missing path {}", path));
            assert!(item.operations.contains_key(&method), "missing {} {}", method_name, path);
        }
    }

    #[test]
    fn test_create_user_documents_conflict() {
        let openapi = ApiDoc::openapi();
        let post = openapi
            .paths
            .paths
            .get("/api/v1/users")
            .and_then(|item| item.operations.get(&PathItemType::Post))
            .unwrap();

        let responses = &post.responses.responses;
        assert!(responses.contains_key("201"));
        assert!(responses.contains_key("400"));
        assert!(responses.contains_key("409"));
    }

    #[test]
    fn test_all_error_responses_reference_correct_schema() {
        let openapi = ApiDoc::openapi();
        let openapi_json = serde_json::to_string(&openapi).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("#/components/schemas/ErrorResponse"));
    }
}
