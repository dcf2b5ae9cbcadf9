use crate::domain::{Command, Operation};
use crate::usecase::CommandClassifier;

fn classify(s: &str) -> Command {
    CommandClassifier::new().unwrap().classify(s)
}

#[test]
fn test_chinese_create_file_scenario() {
    let cmd = classify("创建一个名为\"hello.txt\"的文件，内容是\"Hello, World!\"");
    assert_eq!(
        cmd,
        Command::new(Operation::CreateFile)
            .with("path", "hello.txt")
            .with("content", "Hello, World!")
    );
}

#[test]
fn test_english_create_file_with_content() {
    for (utterance, content) in [
        ("create file \"notes.md\" with content \"hello world\"", "hello world"),
        ("Create a File 'a.txt' content is 'x, y'", "x, y"),
        ("create file \"b.txt\" content: \"colon\"", "colon"),
        ("create file \"c.txt\" with content=\"eq\"", "eq"),
    ] {
        let cmd = classify(utterance);
        assert_eq!(cmd.operation, Operation::CreateFile, "{}", utterance);
        assert_eq!(cmd.str_param("content"), Some(content), "{}", utterance);
    }
}

#[test]
fn test_create_file_free_text_content() {
    let cmd = classify("create file \"todo.txt\" with content: buy milk");
    assert_eq!(cmd.str_param("path"), Some("todo.txt"));
    assert_eq!(cmd.str_param("content"), Some("buy milk"));

    let cmd = classify("创建文件 \"a.txt\" 内容 你好");
    assert_eq!(cmd.str_param("content"), Some("你好"));
}

#[test]
fn test_create_file_accepts_plural_contents() {
    let cmd = classify("create file \"a.txt\" with contents \"hi\"");
    assert_eq!(cmd.str_param("content"), Some("hi"));

    let cmd = classify("create file \"b.txt\" with contents: buy milk");
    assert_eq!(cmd.str_param("content"), Some("buy milk"));
}

#[test]
fn test_free_text_before_filename_is_not_content() {
    // 引用されていない内容はファイル名より後ろだけを見る
    let cmd = classify("create a file with content hello world named \"a.txt\"");
    assert_eq!(cmd.str_param("path"), Some("a.txt"));
    assert_eq!(cmd.str_param("content"), Some(""));

    let cmd = classify("create a file with content \"hello world\" named \"a.txt\"");
    assert_eq!(cmd.str_param("content"), Some("hello world"));
}

#[test]
fn test_create_file_without_content_is_empty() {
    let cmd = classify("create file \"empty.txt\"");
    assert_eq!(cmd.operation, Operation::CreateFile);
    assert_eq!(cmd.str_param("content"), Some(""));
}

#[test]
fn test_content_keyword_inside_filename_is_not_content() {
    let cmd = classify("create file \"content.txt\"");
    assert_eq!(cmd.str_param("path"), Some("content.txt"));
    assert_eq!(cmd.str_param("content"), Some(""));
}

#[test]
fn test_create_file_without_filename_falls_back() {
    let cmd = classify("create a file for my notes");
    assert_eq!(cmd.operation, Operation::AiProcess);
    assert_eq!(cmd.str_param("prompt"), Some("create a file for my notes"));
}

#[test]
fn test_create_directory() {
    let cmd = classify("create directory \"docs\"");
    assert_eq!(cmd, Command::new(Operation::CreateDirectory).with("path", "docs"));
    let cmd = classify("create folder 'src/utils'");
    assert_eq!(cmd.str_param("path"), Some("src/utils"));
    assert_eq!(classify("create a folder").operation, Operation::AiProcess);
}

#[test]
fn test_chinese_folder_hits_file_rule_first() {
    // 文件夹 は 文件 を含むので create_file の規則が先に当たり、拡張子がなければ AI へ
    let cmd = classify("创建文件夹 \"docs\"");
    assert_eq!(cmd.operation, Operation::AiProcess);
}

#[test]
fn test_read_file() {
    let cmd = classify("read \"config.json\"");
    assert_eq!(cmd, Command::new(Operation::ReadFile).with("path", "config.json"));
    assert_eq!(classify("查看 '日志.log'").str_param("path"), Some("日志.log"));
    assert_eq!(classify("view my notes").operation, Operation::AiProcess);
}

#[test]
fn test_list_files() {
    let cmd = classify("list files");
    assert_eq!(
        cmd,
        Command::new(Operation::ListFiles)
            .with("path", ".")
            .with("recursive", false)
    );
    assert_eq!(classify("show all files, recursive").bool_param("recursive"), Some(true));
    assert_eq!(classify("递归列出所有文件").bool_param("recursive"), Some(true));
}

#[test]
fn test_delete_file() {
    let cmd = classify("delete \"old.txt\"");
    assert_eq!(cmd, Command::new(Operation::DeleteFile).with("path", "old.txt"));
    assert_eq!(classify("删除 \"x.py\"").str_param("path"), Some("x.py"));
}

#[test]
fn test_delete_without_token_falls_back() {
    let cmd = classify("delete everything older than a week");
    assert_eq!(cmd.operation, Operation::AiProcess);
    assert_eq!(classify("delete \"folder\"").operation, Operation::AiProcess);
}

#[test]
fn test_copy_file() {
    let cmd = classify("copy \"a.txt\" to \"b.txt\"");
    assert_eq!(
        cmd,
        Command::new(Operation::CopyFile)
            .with("src_path", "a.txt")
            .with("dst_path", "b.txt")
    );
    let cmd = classify("duplicate 'x.md' as 'y.md' and 'z.md'");
    assert_eq!(cmd.str_param("src_path"), Some("x.md"));
    assert_eq!(cmd.str_param("dst_path"), Some("y.md"));
}

#[test]
fn test_copy_with_one_token_falls_back() {
    assert_eq!(classify("copy \"a.txt\"").operation, Operation::AiProcess);
    assert_eq!(classify("复制 \"a.txt\"").operation, Operation::AiProcess);
}

#[test]
fn test_rule_order_is_first_match() {
    // read が delete より先
    assert_eq!(classify("read \"a.txt\" then delete it").operation, Operation::ReadFile);
    // list が copy より先
    assert_eq!(classify("list and copy \"a.txt\" \"b.txt\"").operation, Operation::ListFiles);
}

#[test]
fn test_fallback_keeps_trimmed_original() {
    let cmd = classify("   What is in my Workspace?  ");
    assert_eq!(cmd, Command::ai_process("What is in my Workspace?"));
}

#[test]
fn test_extraction_keeps_original_case() {
    let cmd = classify("DELETE \"Report.PDF\"");
    assert_eq!(cmd.str_param("path"), Some("Report.PDF"));
}
