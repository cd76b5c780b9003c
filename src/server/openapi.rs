//! OpenAPI description served at `/api-docs`

use serde_json::{json, Value};

fn error_response(description: &str, example: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Error" },
                "example": { "message": example }
            }
        }
    })
}

pub fn document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Smart Flashcard API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Flashcard service with automatic subject inference and mixed subject retrieval"
        },
        "servers": [
            { "url": "/api/v1/flashcard" }
        ],
        "paths": {
            "/create-flashcard": {
                "post": {
                    "summary": "Add a new flashcard with automatic subject inference",
                    "tags": ["Flashcards"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/AddFlashcardRequest" },
                                "example": {
                                    "student_id": "stu001",
                                    "question": "What is Newton's Second Law?",
                                    "answer": "Force equals mass times acceleration"
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Flashcard added successfully",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AddFlashcardResponse" }
                                }
                            }
                        },
                        "400": error_response("Missing required fields", "Missing required fields"),
                        "429": error_response("Rate limit exceeded", "Too many requests from this IP, please try again after 15 minutes."),
                        "500": error_response("Server error", "Server error")
                    }
                }
            },
            "/get-subject": {
                "get": {
                    "summary": "Get mixed subject flashcards for a student",
                    "description": "Picks one card from each subject in random order before filling the remaining slots from all other cards.",
                    "tags": ["Flashcards"],
                    "parameters": [
                        {
                            "in": "query",
                            "name": "student_id",
                            "required": true,
                            "schema": { "type": "string" },
                            "example": "stu001"
                        },
                        {
                            "in": "query",
                            "name": "limit",
                            "required": false,
                            "schema": { "type": "integer", "default": 5, "minimum": 1, "maximum": 50 }
                        }
                    ],
                    "responses": {
                        "200": {
                            "description": "List of mixed subject flashcards",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/GetFlashcardsResponse" }
                                }
                            }
                        },
                        "400": error_response("Missing student_id, invalid limit or undecodable query", "Missing student_id"),
                        "429": error_response("Rate limit exceeded", "Too many requests from this IP, please try again after 15 minutes."),
                        "500": error_response("Server error", "Server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "AddFlashcardRequest": {
                    "type": "object",
                    "required": ["student_id", "question", "answer"],
                    "properties": {
                        "student_id": { "type": "string" },
                        "question": { "type": "string" },
                        "answer": { "type": "string" }
                    }
                },
                "AddFlashcardResponse": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string", "example": "Flashcard added successfully" },
                        "subject": { "type": "string", "example": "Physics" }
                    }
                },
                "GetFlashcardsResponse": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": { "type": "string" },
                            "answer": { "type": "string" },
                            "subject": { "type": "string" }
                        }
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" }
                    }
                }
            }
        }
    })
}
