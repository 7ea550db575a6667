//! Fixtures shared by the unit tests.

use std::path::Path;

/// A tiny WN-LMF lexicon: `desk` (two noun senses), `run` (noun and verb), `red` (adjective
/// satellite), `quickly` (adverb), `bank` with a blank first definition, `lamp` whose first synset has no
/// definition, and relations and
/// pronunciations that the loader is expected to skip.
pub const TEST_LMF_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE LexicalResource SYSTEM "http://globalwordnet.github.io/schemas/WN-LMF-1.3.dtd">
<LexicalResource xmlns:dc="http://purl.org/dc/elements/1.1/">
  <Lexicon id="test-en"
           label="Test Wordnet (English)"
           language="en"
           email="test@example.com"
           license="https://example.com/license"
           version="1.0">
    <LexicalEntry id="w-desk-n">
      <Lemma writtenForm="desk" partOfSpeech="n">
        <Pronunciation variety="en-GB-fonipa">dɛsk</Pronunciation>
      </Lemma>
      <Sense id="test-en-desk-n-1" synset="test-en-1-n"/>
      <Sense id="test-en-desk-n-2" synset="test-en-2-n"/>
    </LexicalEntry>
    <LexicalEntry id="w-run-n">
      <Lemma writtenForm="run" partOfSpeech="n"/>
      <Sense id="test-en-run-n-1" synset="test-en-3-n"/>
    </LexicalEntry>
    <LexicalEntry id="w-run-v">
      <Lemma writtenForm="run" partOfSpeech="v"/>
      <Sense id="test-en-run-v-1" synset="test-en-4-v">
        <SenseRelation relType="derivation" target="test-en-run-n-1"/>
      </Sense>
    </LexicalEntry>
    <LexicalEntry id="w-red-s">
      <Lemma writtenForm="Red" partOfSpeech="s"/>
      <Sense id="test-en-red-s-1" synset="test-en-5-s"/>
    </LexicalEntry>
    <LexicalEntry id="w-quickly-r">
      <Lemma writtenForm="quickly" partOfSpeech="r"/>
      <Sense id="test-en-quickly-r-1" synset="test-en-6-r"/>
    </LexicalEntry>
    <LexicalEntry id="w-bank-n">
      <Lemma writtenForm="bank" partOfSpeech="n"/>
      <Sense id="test-en-bank-n-1" synset="test-en-7-n"/>
    </LexicalEntry>
    <LexicalEntry id="w-lamp-n">
      <Lemma writtenForm="lamp" partOfSpeech="n"/>
      <Sense id="test-en-lamp-n-1" synset="test-en-8-n"/>
      <Sense id="test-en-lamp-n-2" synset="test-en-9-n"/>
    </LexicalEntry>
    <Synset id="test-en-1-n" ili="i1" partOfSpeech="n" members="test-en-desk-n-1">
      <Definition>  a piece of furniture with a writing surface  </Definition>
      <SynsetRelation relType="hypernym" target="test-en-2-n"/>
      <Example>he sat at his desk</Example>
    </Synset>
    <Synset id="test-en-2-n" partOfSpeech="n" members="test-en-desk-n-2">
      <Definition>a service counter in a public building</Definition>
    </Synset>
    <Synset id="test-en-3-n" partOfSpeech="n" members="test-en-run-n-1">
      <Definition>a score in baseball</Definition>
    </Synset>
    <Synset id="test-en-4-v" partOfSpeech="v" members="test-en-run-v-1">
      <Definition>move fast by using one's feet</Definition>
    </Synset>
    <Synset id="test-en-5-s" partOfSpeech="s" members="test-en-red-s-1">
      <Definition>of the color of blood</Definition>
    </Synset>
    <Synset id="test-en-6-r" partOfSpeech="r" members="test-en-quickly-r-1">
      <Definition>with rapid movements</Definition>
    </Synset>
    <Synset id="test-en-7-n" partOfSpeech="n" members="test-en-bank-n-1">
      <Definition> </Definition>
    </Synset>
    <Synset id="test-en-8-n" partOfSpeech="n" members="test-en-lamp-n-1"/>
    <Synset id="test-en-9-n" partOfSpeech="n" members="test-en-lamp-n-2">
      <Definition>a source of artificial light</Definition>
    </Synset>
  </Lexicon>
</LexicalResource>
"#;

/// Writes [`TEST_LMF_XML`] into `dir` and returns its path.
pub fn write_test_lmf(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("test-wordnet.xml");
    std::fs::write(&path, TEST_LMF_XML).expect("Failed to write test LMF");
    path
}
