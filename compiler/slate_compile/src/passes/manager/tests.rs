use pretty_assertions::assert_eq;

use super::*;
use crate::passes::{
    CommentPass, EchoPass, ExtensionPass, Extensions, ForelsePass, OpenTagPass, ReplacePass,
};

#[test]
fn standard_order() {
    assert_eq!(
        PassManager::standard().pass_names(),
        vec![
            "extensions",
            "open_tags",
            "comments",
            "echos",
            "forelse",
            "empty",
            "endforelse",
            "structure_openings",
            "structure_closings",
            "else",
            "unless",
            "endunless",
            "includes",
            "layouts",
            "section_start",
            "section_end",
            "yields",
            "yield_sections",
        ]
    );
}

#[test]
fn standard_order_satisfies_requirements() {
    assert_eq!(PassManager::standard().verify(), Ok(()));
    assert_eq!(PassManager::standard().len(), 18);
}

#[test]
fn requirement_scheduled_later_is_rejected() {
    let passes: Vec<Box<dyn Pass>> = vec![Box::new(EchoPass), Box::new(CommentPass)];
    assert!(matches!(
        PassManager::new(passes),
        Err(CompileError::PassOrder {
            pass: "echos",
            requires: "comments"
        })
    ));
}

#[test]
fn missing_requirement_is_rejected() {
    let passes: Vec<Box<dyn Pass>> = vec![Box::new(ReplacePass::new(
        "empty",
        "empty",
        "<% endforeach; %><% else: %>",
        &["forelse"],
    ))];
    assert!(matches!(
        PassManager::new(passes),
        Err(CompileError::MissingPass {
            pass: "empty",
            requires: "forelse"
        })
    ));
}

#[test]
fn custom_pipeline_runs_in_order() {
    let passes: Vec<Box<dyn Pass>> = vec![Box::new(CommentPass), Box::new(EchoPass)];
    let manager = PassManager::new(passes).unwrap_or_else(|e| panic!("{e}"));
    let extensions = Extensions::new();
    let cx = PassContext {
        extensions: &extensions,
    };
    assert_eq!(
        manager.run("{{-- note --}}{{ $x }}", &cx),
        Ok("<% /* note */ %>\n<% echo $x; %>".to_string())
    );
}

#[test]
fn open_tags_need_extensions_first() {
    let passes: Vec<Box<dyn Pass>> = vec![Box::new(OpenTagPass), Box::new(ExtensionPass)];
    assert!(matches!(
        PassManager::new(passes),
        Err(CompileError::PassOrder {
            pass: "open_tags",
            requires: "extensions"
        })
    ));
}

#[test]
fn forelse_alone_is_valid() {
    let passes: Vec<Box<dyn Pass>> = vec![Box::new(ForelsePass::new())];
    assert!(PassManager::new(passes).is_ok());
}
